//! Sampled key frames.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelResult;
use crate::segment::plan_len;

/// Frame-type label recorded for every sampled frame. Sampling is time based,
/// so this is a fixed classification rather than the codec frame type.
pub const KEY_FRAME_TYPE: &str = "I-frame";

/// A still image extracted at `timestamp_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Frame {
    pub id: String,
    /// Zero-based, increases with timestamp
    pub sequence: u32,
    /// Seconds from the start of the source
    pub timestamp_secs: u64,
    /// Object key in the frames bucket
    pub storage_key: String,
    pub is_key_frame: bool,
    pub frame_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Frame {
    /// Build a key frame record from a planned tick.
    pub fn key_frame(tick: FrameTick, storage_key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sequence: tick.sequence,
            timestamp_secs: tick.timestamp_secs,
            storage_key: storage_key.into(),
            is_key_frame: true,
            frame_type: KEY_FRAME_TYPE.to_string(),
            quality: None,
            size_bytes,
            created_at: Utc::now(),
            thumbnail_key: None,
            width: None,
            height: None,
        }
    }
}

/// Planned sampling point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub sequence: u32,
    pub timestamp_secs: u64,
}

/// Timestamps `0, I, 2I, ...` strictly below `duration_secs`.
///
/// `interval_secs` must be non-zero.
pub fn plan_frames(duration_secs: u64, interval_secs: u64) -> ModelResult<Vec<FrameTick>> {
    debug_assert!(interval_secs > 0, "frame interval must be positive");
    if interval_secs == 0 {
        return Ok(Vec::new());
    }

    let mut ticks = Vec::with_capacity(plan_len(duration_secs, interval_secs)?);
    let mut timestamp_secs = 0u64;
    let mut sequence = 0u32;
    while timestamp_secs < duration_secs {
        ticks.push(FrameTick {
            sequence,
            timestamp_secs,
        });
        timestamp_secs = timestamp_secs.saturating_add(interval_secs);
        sequence += 1;
    }
    Ok(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_650_seconds_every_10() {
        let ticks = plan_frames(650, 10).unwrap();
        assert_eq!(ticks.len(), 65);
        assert_eq!(ticks.first().unwrap().timestamp_secs, 0);
        assert_eq!(ticks.last().unwrap().timestamp_secs, 640);
        assert_eq!(ticks.last().unwrap().sequence, 64);
    }

    #[test]
    fn test_plan_zero_duration() {
        assert!(plan_frames(0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_plan_timestamps_strictly_increase_below_duration() {
        for (duration, interval) in [(1, 10), (10, 10), (11, 10), (97, 3)] {
            let ticks = plan_frames(duration, interval).unwrap();
            assert_eq!(ticks.len() as u64, duration.div_ceil(interval));
            for pair in ticks.windows(2) {
                assert!(pair[0].timestamp_secs < pair[1].timestamp_secs);
                assert_eq!(pair[0].sequence + 1, pair[1].sequence);
            }
            assert!(ticks.iter().all(|t| t.timestamp_secs < duration));
        }
    }

    #[test]
    fn test_plan_refuses_absurd_duration() {
        assert!(plan_frames(u64::MAX, 10).is_err());
        assert_eq!(plan_frames(u64::MAX, u64::MAX).unwrap().len(), 1);
    }

    #[test]
    fn test_key_frame_classification_is_fixed() {
        let frame = Frame::key_frame(
            FrameTick {
                sequence: 3,
                timestamp_secs: 30,
            },
            "frame_x.jpg",
            2048,
        );
        assert!(frame.is_key_frame);
        assert_eq!(frame.frame_type, "I-frame");
        assert!(frame.width.is_none() && frame.height.is_none());
    }
}
