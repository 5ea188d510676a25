//! Object storage for the video upload pipeline.
//!
//! This crate provides:
//! - The `ObjectStore` trait (ensure bucket, upload, download)
//! - An S3-compatible implementation (MinIO, R2, AWS)
//! - An in-memory implementation for local runs and tests

pub mod client;
pub mod error;
pub mod memory;
pub mod store;

pub use client::{S3Config, S3ObjectStore};
pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryObjectStore, StoredObject};
pub use store::{ObjectStore, UploadBody};
