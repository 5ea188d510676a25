//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vup_worker::IntakeError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] vup_storage::StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] vup_firestore::FirestoreError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Firestore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Firestore(_)
        )
    }
}

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::Validation(msg) => Self::Validation(msg),
            IntakeError::NotFound(id) => Self::NotFound(format!("Video {}", id)),
            IntakeError::ShuttingDown => Self::ServiceUnavailable("shutting down".to_string()),
            IntakeError::Storage(e) => Self::Storage(e),
            IntakeError::RecordStore(e) => Self::Firestore(e),
            IntakeError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_internal() {
            tracing::error!("Request failed: {}", self);
        }

        // Don't expose internal error details in production
        let detail = if self.is_internal()
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_error_status_mapping() {
        let cases = [
            (
                IntakeError::Validation("Video file is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (IntakeError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (IntakeError::ShuttingDown, StatusCode::SERVICE_UNAVAILABLE),
            (
                IntakeError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (intake, status) in cases {
            assert_eq!(ApiError::from(intake).status_code(), status);
        }
    }

    #[test]
    fn test_validation_detail_is_plain_message() {
        let err = ApiError::from(IntakeError::Validation("Invalid video file format".into()));
        assert_eq!(err.to_string(), "Invalid video file format");
    }
}
