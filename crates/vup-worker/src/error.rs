//! Worker error types.

use thiserror::Error;

use vup_firestore::FirestoreError;
use vup_media::MediaError;
use vup_models::ModelError;
use vup_storage::StorageError;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors raised inside a pipeline run. Any of them fails the run.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Metadata probe failed: {0}")]
    ProbeFailed(#[source] MediaError),

    #[error("Segment {sequence} failed: {source}")]
    SegmentFailed {
        sequence: u32,
        #[source]
        source: MediaError,
    },

    #[error("Frame {sequence} at {timestamp_secs}s failed: {source}")]
    FrameFailed {
        sequence: u32,
        timestamp_secs: u64,
        #[source]
        source: MediaError,
    },

    #[error("Source video unavailable: {0}")]
    SourceUnavailable(#[source] StorageError),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Worker pool is shutting down")]
    ShuttingDown,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Exit code of the failing tool, when a tool failure caused this error.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::ProbeFailed(e)
            | Self::SegmentFailed { source: e, .. }
            | Self::FrameFailed { source: e, .. }
            | Self::Media(e) => e.exit_code(),
            _ => None,
        }
    }
}

/// Errors returned to the caller of the intake path.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Service is shutting down")]
    ShuttingDown,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Record store error: {0}")]
    RecordStore(#[from] FirestoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ModelError> for IntakeError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<WorkerError> for IntakeError {
    fn from(e: WorkerError) -> Self {
        match e {
            WorkerError::ShuttingDown => Self::ShuttingDown,
            WorkerError::Storage(e) => Self::Storage(e),
            WorkerError::Firestore(e) => Self::RecordStore(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_failure_names_sequence_and_exit_code() {
        let err = WorkerError::SegmentFailed {
            sequence: 2,
            source: MediaError::tool_failed("ffmpeg", Some(1), "Invalid data found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Segment 2"));
        assert!(msg.contains("code 1"));
        assert_eq!(err.tool_exit_code(), Some(1));
    }

    #[test]
    fn test_validation_maps_to_intake_validation() {
        let err: IntakeError = ModelError::validation("Video file is required").into();
        assert!(matches!(err, IntakeError::Validation(_)));
    }
}
