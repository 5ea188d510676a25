//! Segmentation stage: split the source into fixed-length stream copies.

use std::path::Path;

use tracing::debug;
use vup_media::extract_segment;
use vup_models::{plan_segments, ObjectKind, Segment, SegmentSpan, Video};
use vup_storage::UploadBody;

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics::record_upload;
use crate::stages::scratch_file;

/// Build, upload and persist every segment, or none of them.
pub async fn segment_video(
    ctx: &PipelineContext,
    mut video: Video,
    source: &Path,
    scratch_dir: &Path,
) -> WorkerResult<Video> {
    let spans = plan_segments(video.duration_secs, ctx.config.segment_length_secs)?;
    let mut segments = Vec::with_capacity(spans.len());

    for span in spans {
        segments.push(build_segment(ctx, source, scratch_dir, span).await?);
    }

    debug!(video_id = %video.id, count = segments.len(), "Segments built");
    video.set_segments(segments);
    ctx.repo.save(&video).await?;
    Ok(video)
}

async fn build_segment(
    ctx: &PipelineContext,
    source: &Path,
    scratch_dir: &Path,
    span: SegmentSpan,
) -> WorkerResult<Segment> {
    let kind = ObjectKind::Segment;
    let scratch = scratch_file(scratch_dir, "segment_", ".mp4")?;

    extract_segment(
        ctx.runner.as_ref(),
        &ctx.config.ffmpeg_path,
        source,
        span.start_secs,
        span.duration_secs(),
        &scratch,
    )
    .await
    .map_err(|source| WorkerError::SegmentFailed {
        sequence: span.sequence,
        source,
    })?;

    let size = tokio::fs::metadata(&scratch).await?.len();
    let key = kind.generate_key();
    ctx.storage
        .upload(
            &ctx.config.buckets.segments,
            &key,
            UploadBody::file(&scratch),
            kind.content_type(),
        )
        .await?;
    record_upload("segment");

    Ok(Segment::ready(span, key, size))
}
