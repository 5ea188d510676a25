//! Intake: accept an upload, persist it, and hand it to the pool.

use std::sync::Arc;

use tracing::{info, warn};

use vup_models::{ObjectKind, UploadRequest, Video, VideoId, VideoStatus};
use vup_storage::UploadBody;

use crate::context::PipelineContext;
use crate::error::IntakeError;
use crate::metrics::record_upload;
use crate::pool::WorkerPool;

#[derive(Clone)]
pub struct IntakeService {
    ctx: PipelineContext,
    pool: Arc<WorkerPool>,
}

impl IntakeService {
    pub fn new(ctx: PipelineContext, pool: Arc<WorkerPool>) -> Self {
        Self { ctx, pool }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Validate, persist at UPLOADED, upload the source and queue a run.
    ///
    /// Returns as soon as the run is queued. Nothing is written when
    /// validation fails.
    pub async fn accept(&self, request: UploadRequest) -> Result<Video, IntakeError> {
        let upload = request.into_validated()?;

        if !self.pool.is_accepting() {
            return Err(IntakeError::ShuttingDown);
        }

        let source_key = ObjectKind::Video.generate_key();
        let video = Video::new(upload.title, upload.owner_id, upload.file_name, source_key)
            .with_description(upload.description)
            .with_visibility(upload.visibility);

        self.ctx.repo.create(&video).await?;

        let size = upload.bytes.len();
        if let Err(e) = self
            .ctx
            .storage
            .upload(
                &self.ctx.config.buckets.videos,
                &video.source_key,
                UploadBody::Bytes(upload.bytes),
                upload.format.content_type(),
            )
            .await
        {
            warn!(video_id = %video.id, "Source upload failed: {}", e);
            self.abandon(video).await;
            return Err(e.into());
        }
        record_upload("video");

        if let Err(e) = self.pool.submit(video.id.clone()) {
            warn!(video_id = %video.id, "Could not queue run: {}", e);
            self.abandon(video).await;
            return Err(e.into());
        }

        info!(
            video_id = %video.id,
            format = upload.format.extension(),
            size_bytes = size,
            "Video accepted"
        );
        Ok(video)
    }

    /// Fetch a video that has not been deleted.
    pub async fn get(&self, video_id: &VideoId) -> Result<Video, IntakeError> {
        match self.ctx.repo.get(video_id).await? {
            Some(video) if !video.deleted => Ok(video),
            _ => Err(IntakeError::NotFound(video_id.to_string())),
        }
    }

    /// Set the soft-delete flag. The record is kept, and a run in flight
    /// carries on without clearing the flag.
    pub async fn soft_delete(&self, video_id: &VideoId) -> Result<(), IntakeError> {
        self.get(video_id).await?;
        self.ctx.repo.mark_deleted(video_id).await?;
        info!(video_id = %video_id, "Video soft-deleted");
        Ok(())
    }

    /// Move a video that will never run to FAILED.
    async fn abandon(&self, mut video: Video) {
        if video.transition_to(VideoStatus::Failed).is_err() {
            return;
        }
        if let Err(e) = self.ctx.repo.save(&video).await {
            warn!(video_id = %video.id, "Could not mark abandoned video as failed: {}", e);
        }
    }
}
