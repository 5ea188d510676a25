//! Still frame extraction.

use std::path::Path;

use crate::command::{FfmpegCommand, ToolCommand, ToolRunner};
use crate::error::MediaResult;

/// JPEG quality passed to `-q:v` (2 is near-lossless).
pub const FRAME_JPEG_QUALITY: u8 = 2;

/// Grab exactly one frame at `offset_secs`.
pub fn frame_grab_command(
    ffmpeg: &str,
    input: impl AsRef<Path>,
    offset_secs: u64,
    output: impl AsRef<Path>,
) -> ToolCommand {
    FfmpegCommand::new(ffmpeg, input, output)
        .seek(offset_secs)
        .single_frame()
        .output_arg("-q:v")
        .output_arg(FRAME_JPEG_QUALITY.to_string())
        .build()
}

pub async fn extract_frame(
    runner: &dyn ToolRunner,
    ffmpeg: &str,
    input: impl AsRef<Path>,
    offset_secs: u64,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let cmd = frame_grab_command(ffmpeg, input, offset_secs, output);
    runner.run(&cmd).await?.into_success(cmd.tool_name())?;
    Ok(())
}
