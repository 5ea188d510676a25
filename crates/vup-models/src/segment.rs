//! Playback segments.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Segment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    #[default]
    Pending,
    Ready,
    Failed,
}

impl SegmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStatus::Pending => "pending",
            SegmentStatus::Ready => "ready",
            SegmentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SegmentStatus::Pending),
            "ready" => Some(SegmentStatus::Ready),
            "failed" => Some(SegmentStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contiguous `[start_secs, end_secs)` range of the source, stored as an
/// independently playable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    pub id: String,
    /// Zero-based, contiguous
    pub sequence: u32,
    pub status: SegmentStatus,
    /// Object key in the segments bucket
    pub storage_key: String,
    pub start_secs: u64,
    /// Exclusive
    pub end_secs: u64,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Segment {
    /// Build a ready segment from a planned span.
    pub fn ready(span: SegmentSpan, storage_key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sequence: span.sequence,
            status: SegmentStatus::Ready,
            storage_key: storage_key.into(),
            start_secs: span.start_secs,
            end_secs: span.end_secs,
            size_bytes,
            quality: None,
            created_at: Utc::now(),
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.end_secs - self.start_secs
    }
}

/// Planned time range for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    pub sequence: u32,
    pub start_secs: u64,
    pub end_secs: u64,
}

impl SegmentSpan {
    pub fn duration_secs(&self) -> u64 {
        self.end_secs - self.start_secs
    }
}

/// Upper bound on the segments or frames planned for one video.
pub const MAX_PLANNED_ITEMS: u64 = 1_000_000;

/// Number of steps of `step_secs` needed to cover `duration_secs`, refused
/// above [`MAX_PLANNED_ITEMS`].
pub(crate) fn plan_len(duration_secs: u64, step_secs: u64) -> ModelResult<usize> {
    let count = duration_secs.div_ceil(step_secs);
    if count > MAX_PLANNED_ITEMS {
        return Err(ModelError::PlanTooLarge {
            count,
            limit: MAX_PLANNED_ITEMS,
        });
    }
    usize::try_from(count).map_err(|_| ModelError::PlanTooLarge {
        count,
        limit: MAX_PLANNED_ITEMS,
    })
}

/// Split `[0, duration_secs)` into consecutive spans of `segment_length_secs`;
/// the last span may be shorter. Zero duration yields no spans.
///
/// `segment_length_secs` must be non-zero.
pub fn plan_segments(
    duration_secs: u64,
    segment_length_secs: u64,
) -> ModelResult<Vec<SegmentSpan>> {
    debug_assert!(segment_length_secs > 0, "segment length must be positive");
    if segment_length_secs == 0 {
        return Ok(Vec::new());
    }

    let mut spans = Vec::with_capacity(plan_len(duration_secs, segment_length_secs)?);
    let mut start = 0u64;
    let mut sequence = 0u32;
    while start < duration_secs {
        let end = start.saturating_add(segment_length_secs).min(duration_secs);
        spans.push(SegmentSpan {
            sequence,
            start_secs: start,
            end_secs: end,
        });
        start = end;
        sequence += 1;
    }
    Ok(spans)
}
