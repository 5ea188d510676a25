//! Pipeline stages.
//!
//! Each stage takes the video by value, persists its result once, and hands
//! the updated video back. A stage that fails persists nothing.

pub mod keyframes;
pub mod metadata;
pub mod segmentation;

use std::path::Path;

use tempfile::TempPath;

use crate::error::WorkerResult;

pub use keyframes::extract_key_frames;
pub use metadata::extract_metadata;
pub use segmentation::segment_video;

/// Create an empty scratch file in `dir`. The file is removed when the
/// returned path is dropped, including when the owning task is aborted.
pub(crate) fn scratch_file(dir: &Path, prefix: &str, suffix: &str) -> WorkerResult<TempPath> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}
