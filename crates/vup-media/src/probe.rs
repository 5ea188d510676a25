//! FFprobe duration probing.

use std::path::Path;

use crate::command::{ToolCommand, ToolRunner};
use crate::error::{MediaError, MediaResult};

/// Build the ffprobe command that prints only the container duration.
pub fn duration_probe_command(ffprobe: &str, input: impl AsRef<Path>) -> ToolCommand {
    ToolCommand::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input.as_ref().to_string_lossy())
}

/// Longest source accepted, one week. Larger probe results are treated as
/// garbage output.
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Parse ffprobe's duration output, truncating toward zero to whole seconds.
pub fn parse_duration_secs(raw: &str) -> MediaResult<u64> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| MediaError::InvalidOutput(raw.to_string()))?;

    if !value.is_finite() || value < 0.0 || value >= (MAX_DURATION_SECS + 1) as f64 {
        return Err(MediaError::InvalidOutput(raw.to_string()));
    }

    Ok(value.trunc() as u64)
}

/// Probe a local file for its duration in whole seconds.
pub async fn probe_duration(
    runner: &dyn ToolRunner,
    ffprobe: &str,
    input: impl AsRef<Path>,
) -> MediaResult<u64> {
    let cmd = duration_probe_command(ffprobe, input);
    let output = runner.run(&cmd).await?.into_success(cmd.tool_name())?;
    parse_duration_secs(&output.stdout)
}
