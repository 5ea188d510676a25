//! Video API handlers.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use vup_models::{UploadRequest, UploadedFile, VideoId, VideoResponse, Visibility};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/videos
///
/// Multipart fields: `file`, `title`, `description`, `owner_id`, `visibility`.
/// Responds as soon as the video is stored and queued; processing status is
/// read back later through `GET /api/videos/:video_id`.
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VideoResponse>)> {
    let request = read_upload(multipart).await?;
    let video = state.intake.accept(request).await?;

    info!(video_id = %video.id, "Upload accepted");
    Ok((StatusCode::CREATED, Json(VideoResponse::from(&video))))
}

/// GET /api/videos/:video_id
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoResponse>> {
    let video = state.intake.get(&VideoId::from(video_id)).await?;
    Ok(Json(VideoResponse::from(&video)))
}

/// DELETE /api/videos/:video_id
///
/// Soft delete: the record is flagged and kept.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.intake.soft_delete(&VideoId::from(video_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<UploadRequest> {
    let mut request = UploadRequest {
        file: None,
        title: String::new(),
        description: None,
        owner_id: String::new(),
        visibility: Visibility::default(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                request.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "title" => request.title = read_text(field).await?,
            "description" => request.description = Some(read_text(field).await?),
            "owner_id" => request.owner_id = read_text(field).await?,
            "visibility" => {
                let text = read_text(field).await?;
                request.visibility = Visibility::parse(&text).ok_or_else(|| {
                    ApiError::Validation(format!("Invalid visibility '{}'", text))
                })?;
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(request)
}

async fn read_text(field: Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))
}
