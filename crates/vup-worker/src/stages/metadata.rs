//! Metadata stage: probe the source duration.

use std::path::Path;

use tracing::debug;
use vup_media::probe_duration;
use vup_models::Video;

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};

/// Probe `source` and persist the truncated duration.
pub async fn extract_metadata(
    ctx: &PipelineContext,
    mut video: Video,
    source: &Path,
) -> WorkerResult<Video> {
    let duration = probe_duration(ctx.runner.as_ref(), &ctx.config.ffprobe_path, source)
        .await
        .map_err(WorkerError::ProbeFailed)?;

    debug!(video_id = %video.id, duration_secs = duration, "Probed duration");
    video.set_duration(duration);
    ctx.repo.save(&video).await?;
    Ok(video)
}
