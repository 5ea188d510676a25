//! Shared data models for the video upload pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Videos and their processing status state machine
//! - Segments and key frames, plus the planning of their time ranges
//! - Object-storage key generation
//! - Upload requests and recognised source formats

pub mod error;
pub mod frame;
pub mod object_key;
pub mod response;
pub mod segment;
pub mod upload;
pub mod video;

pub use error::{ModelError, ModelResult};
pub use frame::{plan_frames, Frame, FrameTick, KEY_FRAME_TYPE};
pub use object_key::ObjectKind;
pub use response::{FrameResponse, SegmentResponse, VideoResponse};
pub use segment::{plan_segments, Segment, MAX_PLANNED_ITEMS, SegmentSpan, SegmentStatus};
pub use upload::{UploadRequest, UploadedFile, ValidatedUpload, VideoFormat};
pub use video::{Video, VideoId, VideoStatus, Visibility};
