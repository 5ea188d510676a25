//! Segment extraction.

use std::path::Path;

use tracing::debug;

use crate::command::{FfmpegCommand, ToolCommand, ToolRunner};
use crate::error::MediaResult;

/// Stream-copy `[start, start + duration)` into a standalone file whose
/// timestamps start at zero.
pub fn segment_command(
    ffmpeg: &str,
    input: impl AsRef<Path>,
    start_secs: u64,
    duration_secs: u64,
    output: impl AsRef<Path>,
) -> ToolCommand {
    FfmpegCommand::new(ffmpeg, input, output)
        .seek(start_secs)
        .duration(duration_secs)
        .codec_copy()
        .output_args(["-avoid_negative_ts", "make_zero"])
        .build()
}

pub async fn extract_segment(
    runner: &dyn ToolRunner,
    ffmpeg: &str,
    input: impl AsRef<Path>,
    start_secs: u64,
    duration_secs: u64,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let cmd = segment_command(ffmpeg, input, start_secs, duration_secs, output);
    debug!("Extracting segment at {}s for {}s", start_secs, duration_secs);
    runner.run(&cmd).await?.into_success(cmd.tool_name())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_command() {
        let cmd = segment_command("ffmpeg", "in.mkv", 300, 50, "out.mp4");
        assert_eq!(
            cmd.to_string(),
            "ffmpeg -y -v error -i in.mkv -ss 300 -t 50 -c copy -avoid_negative_ts make_zero out.mp4"
        );
    }
}
