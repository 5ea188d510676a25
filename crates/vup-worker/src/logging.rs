//! Structured logging for pipeline runs.

use tracing::{error, info, warn, Span};
use vup_models::VideoId;

/// Logger carrying the video id of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    video_id: String,
}

impl RunLogger {
    pub fn new(video_id: &VideoId) -> Self {
        Self {
            video_id: video_id.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(video_id = %self.video_id, "Run started: {}", message);
    }

    pub fn log_stage(&self, stage: &str, message: &str) {
        info!(video_id = %self.video_id, stage = %stage, "{}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(video_id = %self.video_id, "Run warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(video_id = %self.video_id, "Run failed: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(video_id = %self.video_id, "Run completed: {}", message);
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Span to instrument the whole run with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("pipeline_run", video_id = %self.video_id)
    }
}
