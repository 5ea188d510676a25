//! Video entity and processing status state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};
use crate::frame::Frame;
use crate::segment::Segment;

/// Opaque identifier of a video record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status.
///
/// ```text
/// Uploaded ──> Processing ──> Ready
///    │             │
///    └─────────────┴────────> Failed
/// ```
///
/// `Ready` and `Failed` are terminal. `Uploaded -> Failed` only happens when a
/// video is abandoned before its run starts (intake upload failure or a
/// queued run dropped at shutdown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Accepted by intake, waiting for a worker
    #[default]
    Uploaded,
    /// A pipeline run owns the video
    Processing,
    /// All stages completed
    Ready,
    /// A stage failed or the run was abandoned
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processing => "processing",
            VideoStatus::Ready => "ready",
            VideoStatus::Failed => "failed",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(VideoStatus::Uploaded),
            "processing" => Some(VideoStatus::Processing),
            "ready" => Some(VideoStatus::Ready),
            "failed" => Some(VideoStatus::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no more transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Ready | VideoStatus::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: VideoStatus) -> bool {
        matches!(
            (self, next),
            (VideoStatus::Uploaded, VideoStatus::Processing)
                | (VideoStatus::Uploaded, VideoStatus::Failed)
                | (VideoStatus::Processing, VideoStatus::Ready)
                | (VideoStatus::Processing, VideoStatus::Failed)
        )
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who can see a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Unlisted,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        }
    }

    /// Parse a visibility value, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "unlisted" => Some(Visibility::Unlisted),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Root video record.
///
/// `segments` and `frames` stay empty until their stage has completed; both
/// are kept in temporal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,

    /// Video title
    pub title: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Uploader
    pub owner_id: String,

    /// Filename as supplied by the uploader
    pub original_filename: String,

    /// Object key of the source file in the videos bucket
    pub source_key: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub views: u64,

    /// Duration in whole seconds (fraction truncated)
    #[serde(default)]
    pub duration_secs: u64,

    #[serde(default)]
    pub status: VideoStatus,

    #[serde(default)]
    pub segments: Vec<Segment>,

    #[serde(default)]
    pub frames: Vec<Frame>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Soft-delete flag; the record is retained
    #[serde(default)]
    pub deleted: bool,
}

impl Video {
    /// Create a new record at `Uploaded`.
    pub fn new(
        title: impl Into<String>,
        owner_id: impl Into<String>,
        original_filename: impl Into<String>,
        source_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            title: title.into(),
            description: None,
            owner_id: owner_id.into(),
            original_filename: original_filename.into(),
            source_key: source_key.into(),
            visibility: Visibility::default(),
            views: 0,
            duration_secs: 0,
            status: VideoStatus::Uploaded,
            segments: Vec::new(),
            frames: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Move to `next`, refreshing `updated_at`.
    pub fn transition_to(&mut self, next: VideoStatus) -> ModelResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(ModelError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Record the probed duration.
    pub fn set_duration(&mut self, duration_secs: u64) {
        self.duration_secs = duration_secs;
        self.touch();
    }

    /// Replace the segment list with the output of a completed stage.
    pub fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
        self.touch();
    }

    /// Replace the frame list with the output of a completed stage.
    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
        self.touch();
    }

    /// Flag as deleted without removing the record.
    pub fn soft_delete(&mut self) {
        self.deleted = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Video {
        Video::new("Demo", "owner-1", "demo.mp4", "video_abc.mp4")
    }

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_video_starts_uploaded_and_empty() {
        let video = sample();
        assert_eq!(video.status, VideoStatus::Uploaded);
        assert_eq!(video.duration_secs, 0);
        assert_eq!(video.views, 0);
        assert!(video.segments.is_empty());
        assert!(video.frames.is_empty());
        assert!(!video.deleted);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut video = sample();
        video.transition_to(VideoStatus::Processing).unwrap();
        video.transition_to(VideoStatus::Ready).unwrap();
        assert_eq!(video.status, VideoStatus::Ready);
        assert!(video.status.is_terminal());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [VideoStatus::Ready, VideoStatus::Failed] {
            for next in [
                VideoStatus::Uploaded,
                VideoStatus::Processing,
                VideoStatus::Ready,
                VideoStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn test_cannot_skip_processing_to_ready() {
        let mut video = sample();
        let err = video.transition_to(VideoStatus::Ready).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidTransition {
                from: VideoStatus::Uploaded,
                to: VideoStatus::Ready
            }
        ));
        assert_eq!(video.status, VideoStatus::Uploaded);
    }

    #[test]
    fn test_status_string_form() {
        assert_eq!(VideoStatus::parse("ready"), Some(VideoStatus::Ready));
        assert_eq!(VideoStatus::parse("bogus"), None);
        assert_eq!(
            serde_json::to_string(&VideoStatus::Processing).unwrap(),
            "\"processing\""
        );
    }

    #[test]
    fn test_visibility_parse_is_case_insensitive() {
        assert_eq!(Visibility::parse("PRIVATE"), Some(Visibility::Private));
        assert_eq!(Visibility::parse(" Unlisted "), Some(Visibility::Unlisted));
        assert_eq!(Visibility::parse("secret"), None);
    }

    #[test]
    fn test_soft_delete_keeps_record() {
        let mut video = sample();
        video.soft_delete();
        assert!(video.deleted);
        assert_eq!(video.title, "Demo");
    }
}
