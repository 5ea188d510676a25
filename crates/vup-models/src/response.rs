//! Read-side projection of a video.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::segment::Segment;
use crate::video::{Video, VideoStatus, Visibility};

/// Video as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_id: String,
    pub original_filename: String,
    pub status: VideoStatus,
    pub source_key: String,
    pub visibility: Visibility,
    pub views: u64,
    pub duration_secs: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub segments: Vec<SegmentResponse>,
    pub key_frames: Vec<FrameResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SegmentResponse {
    pub id: String,
    pub sequence: u32,
    pub start_secs: u64,
    pub end_secs: u64,
    pub storage_key: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FrameResponse {
    pub id: String,
    pub sequence: u32,
    pub timestamp_secs: u64,
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl From<&Segment> for SegmentResponse {
    fn from(s: &Segment) -> Self {
        Self {
            id: s.id.clone(),
            sequence: s.sequence,
            start_secs: s.start_secs,
            end_secs: s.end_secs,
            storage_key: s.storage_key.clone(),
            size_bytes: s.size_bytes,
        }
    }
}

impl From<&Frame> for FrameResponse {
    fn from(f: &Frame) -> Self {
        Self {
            id: f.id.clone(),
            sequence: f.sequence,
            timestamp_secs: f.timestamp_secs,
            storage_key: f.storage_key.clone(),
            width: f.width,
            height: f.height,
        }
    }
}

impl From<&Video> for VideoResponse {
    fn from(v: &Video) -> Self {
        Self {
            id: v.id.to_string(),
            title: v.title.clone(),
            description: v.description.clone(),
            owner_id: v.owner_id.clone(),
            original_filename: v.original_filename.clone(),
            status: v.status,
            source_key: v.source_key.clone(),
            visibility: v.visibility,
            views: v.views,
            duration_secs: v.duration_secs,
            created_at: v.created_at,
            updated_at: v.updated_at,
            segments: v.segments.iter().map(SegmentResponse::from).collect(),
            key_frames: v.frames.iter().map(FrameResponse::from).collect(),
        }
    }
}
