//! External media tool invocation for the video upload pipeline.
//!
//! This crate provides:
//! - A `ToolRunner` boundary that returns exit code plus captured output
//! - FFmpeg/FFprobe command building
//! - Duration probing, segment extraction and frame grabbing

pub mod command;
pub mod error;
pub mod frame;
pub mod probe;
pub mod segment;

pub use command::{check_tool, FfmpegCommand, ProcessRunner, ToolCommand, ToolOutput, ToolRunner};
pub use error::{MediaError, MediaResult};
pub use frame::{extract_frame, frame_grab_command};
pub use probe::{duration_probe_command, parse_duration_secs, probe_duration, MAX_DURATION_SECS};
pub use segment::{extract_segment, segment_command};
