//! Key-frame stage: grab one still per sampling interval.

use std::path::Path;

use tracing::debug;
use vup_media::extract_frame;
use vup_models::{plan_frames, Frame, FrameTick, ObjectKind, Video};
use vup_storage::UploadBody;

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics::record_upload;
use crate::stages::scratch_file;

/// Build, upload and persist every frame, or none of them.
pub async fn extract_key_frames(
    ctx: &PipelineContext,
    mut video: Video,
    source: &Path,
    scratch_dir: &Path,
) -> WorkerResult<Video> {
    let ticks = plan_frames(video.duration_secs, ctx.config.frame_interval_secs)?;
    let mut frames = Vec::with_capacity(ticks.len());

    for tick in ticks {
        frames.push(build_frame(ctx, source, scratch_dir, tick).await?);
    }

    debug!(video_id = %video.id, count = frames.len(), "Key frames built");
    video.set_frames(frames);
    ctx.repo.save(&video).await?;
    Ok(video)
}

async fn build_frame(
    ctx: &PipelineContext,
    source: &Path,
    scratch_dir: &Path,
    tick: FrameTick,
) -> WorkerResult<Frame> {
    let kind = ObjectKind::Frame;
    let scratch = scratch_file(scratch_dir, "frame_", ".jpg")?;

    extract_frame(
        ctx.runner.as_ref(),
        &ctx.config.ffmpeg_path,
        source,
        tick.timestamp_secs,
        &scratch,
    )
    .await
    .map_err(|source| WorkerError::FrameFailed {
        sequence: tick.sequence,
        timestamp_secs: tick.timestamp_secs,
        source,
    })?;

    let size = tokio::fs::metadata(&scratch).await?.len();
    let key = kind.generate_key();
    ctx.storage
        .upload(
            &ctx.config.buckets.frames,
            &key,
            UploadBody::file(&scratch),
            kind.content_type(),
        )
        .await?;
    record_upload("frame");

    Ok(Frame::key_frame(tick, key, size))
}
