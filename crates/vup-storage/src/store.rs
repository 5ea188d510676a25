//! Object store abstraction.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageResult;

/// Payload for an upload.
#[derive(Debug, Clone)]
pub enum UploadBody {
    Bytes(Vec<u8>),
    /// Streamed from a local file.
    File(PathBuf),
}

impl UploadBody {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl From<Vec<u8>> for UploadBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Bucketed blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    async fn create_bucket(&self, bucket: &str) -> StorageResult<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: UploadBody,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Download an object into `path`, returning the number of bytes written.
    async fn download_to_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<u64>;

    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        if !self.bucket_exists(bucket).await? {
            self.create_bucket(bucket).await?;
        }
        Ok(())
    }

    /// Ensure the bucket, then write the object.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: UploadBody,
        content_type: &str,
    ) -> StorageResult<()> {
        self.ensure_bucket(bucket).await?;
        self.put_object(bucket, key, body, content_type).await
    }
}
