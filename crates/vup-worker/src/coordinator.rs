//! Pipeline coordinator: drives one video through the status state machine.
//!
//! A run moves the video UPLOADED -> PROCESSING, stages the source locally,
//! runs metadata, segmentation and key-frame extraction in order, and ends
//! at READY. Any error collapses the video to FAILED; nothing is returned to
//! the submitter.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::Instrument;

use vup_models::{Video, VideoFormat, VideoId, VideoStatus};

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::metrics::{record_run, timed};
use crate::stages::{extract_key_frames, extract_metadata, segment_video};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ready,
    Failed,
    /// The video was missing or not in a startable state.
    Skipped,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Ready => "ready",
            RunOutcome::Failed => "failed",
            RunOutcome::Skipped => "skipped",
        }
    }
}

#[derive(Clone)]
pub struct PipelineCoordinator {
    ctx: PipelineContext,
}

impl PipelineCoordinator {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// Process one video to a terminal status.
    pub async fn run(&self, video_id: &VideoId) -> RunOutcome {
        let logger = RunLogger::new(video_id);
        let span = logger.create_span();
        self.run_logged(video_id, &logger).instrument(span).await
    }

    async fn run_logged(&self, video_id: &VideoId, logger: &RunLogger) -> RunOutcome {
        let video = match self.start(video_id).await {
            Ok(Some(video)) => video,
            Ok(None) => return RunOutcome::Skipped,
            Err(e) => {
                // A dequeued run must not stay at UPLOADED
                logger.log_error(&format!("could not start: {}", e));
                if let Err(mark_err) = self.mark_failed(video_id).await {
                    logger.log_warning(&format!("could not mark as failed: {}", mark_err));
                }
                record_run("failed");
                return RunOutcome::Failed;
            }
        };

        logger.log_start(&video.original_filename);

        match self.process(video, logger).await {
            Ok(video) => {
                logger.log_completion(&format!(
                    "{} segments, {} key frames",
                    video.segments.len(),
                    video.frames.len()
                ));
                record_run("ready");
                RunOutcome::Ready
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                if let Err(mark_err) = self.mark_failed(video_id).await {
                    logger.log_warning(&format!("could not mark as failed: {}", mark_err));
                }
                record_run("failed");
                RunOutcome::Failed
            }
        }
    }

    /// Load the video and move it to PROCESSING. `None` if there is nothing to run.
    async fn start(&self, video_id: &VideoId) -> WorkerResult<Option<Video>> {
        let Some(mut video) = self.ctx.repo.get(video_id).await? else {
            tracing::warn!(video_id = %video_id, "Video not found, skipping run");
            return Ok(None);
        };

        if video.status != VideoStatus::Uploaded {
            tracing::warn!(
                video_id = %video_id,
                status = %video.status,
                "Video is not awaiting processing, skipping run"
            );
            return Ok(None);
        }

        video.transition_to(VideoStatus::Processing)?;
        self.ctx.repo.save(&video).await?;
        Ok(Some(video))
    }

    async fn process(&self, video: Video, logger: &RunLogger) -> WorkerResult<Video> {
        // Everything written during the run lives here and is removed with it
        let run_dir = self.create_run_dir().await?;
        let source = self.stage_source(&video, run_dir.path()).await?;

        logger.log_stage("metadata", "probing duration");
        let video = timed("metadata", extract_metadata(&self.ctx, video, &source)).await?;

        logger.log_stage("segmentation", &format!("duration {}s", video.duration_secs));
        let video = timed(
            "segmentation",
            segment_video(&self.ctx, video, &source, run_dir.path()),
        )
        .await?;

        logger.log_stage("keyframes", &format!("{} segments stored", video.segments.len()));
        let mut video = timed(
            "keyframes",
            extract_key_frames(&self.ctx, video, &source, run_dir.path()),
        )
        .await?;

        video.transition_to(VideoStatus::Ready)?;
        self.ctx.repo.save(&video).await?;
        Ok(video)
    }

    async fn create_run_dir(&self) -> WorkerResult<TempDir> {
        let root = &self.ctx.config.work_dir;
        tokio::fs::create_dir_all(root).await?;
        Ok(tempfile::Builder::new().prefix("run_").tempdir_in(root)?)
    }

    /// Download the source object into `dir`.
    async fn stage_source(&self, video: &Video, dir: &Path) -> WorkerResult<PathBuf> {
        let ext = VideoFormat::from_filename(&video.original_filename)
            .map(|f| f.extension())
            .unwrap_or("mp4");
        let path = dir.join(format!("source.{}", ext));

        self.ctx
            .storage
            .download_to_file(&self.ctx.config.buckets.videos, &video.source_key, &path)
            .await
            .map_err(WorkerError::SourceUnavailable)?;

        Ok(path)
    }

    /// Reload the latest persisted record and move it to FAILED.
    ///
    /// The record is re-read because a failing stage discards its in-memory
    /// copy; earlier stages' results are already persisted.
    pub async fn mark_failed(&self, video_id: &VideoId) -> WorkerResult<()> {
        let mut video = self
            .ctx
            .repo
            .get(video_id)
            .await?
            .ok_or_else(|| WorkerError::VideoNotFound(video_id.to_string()))?;

        if video.status.is_terminal() {
            return Ok(());
        }

        video.transition_to(VideoStatus::Failed)?;
        self.ctx.repo.save(&video).await?;
        Ok(())
    }

    /// Fail a run that was cut short by shutdown.
    pub async fn mark_interrupted(&self, video_id: &VideoId) {
        match self.mark_failed(video_id).await {
            Ok(()) => {
                tracing::warn!(video_id = %video_id, "Run interrupted by shutdown, marked failed");
                record_run("interrupted");
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, "Could not mark interrupted run as failed: {}", e);
            }
        }
    }
}
