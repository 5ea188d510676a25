//! Model error types.

use thiserror::Error;

use crate::video::VideoStatus;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: VideoStatus, to: VideoStatus },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Plan of {count} items exceeds the limit of {limit}")]
    PlanTooLarge { count: u64, limit: u64 },
}

impl ModelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
