//! External tool commands and the runner that executes them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// A fully built external command: program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Short tool name for logs and metrics, e.g. `ffprobe` for `/usr/bin/ffprobe`.
    pub fn tool_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.program.as_str())
    }

    /// Path of the last argument, which for ffmpeg commands is the output file.
    pub fn output_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of one tool execution. A non-zero exit is not an error
/// at this level; callers decide via [`ToolOutput::into_success`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into [`MediaError::ToolFailed`].
    pub fn into_success(self, tool: &str) -> MediaResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(MediaError::tool_failed(tool, self.exit_code, self.stderr))
        }
    }
}

/// Executes external commands.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, cmd: &ToolCommand) -> MediaResult<ToolOutput>;
}

/// Runs commands as child processes.
///
/// Both output streams are drained to completion before the exit status is
/// read. The child is killed if the future running it is dropped, so an
/// aborted worker never leaves an orphaned ffmpeg behind.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, cmd: &ToolCommand) -> MediaResult<ToolOutput> {
        let tool = cmd.tool_name().to_string();
        let program = check_tool(cmd.program())?;

        debug!("Running {}: {}", tool, cmd);
        let start = Instant::now();

        let output = Command::new(&program)
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        let result = ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        let outcome = if result.success() { "success" } else { "failure" };
        metrics::counter!("vup_tool_invocations_total", "tool" => tool.clone(), "outcome" => outcome)
            .increment(1);
        debug!(
            "{} exited with {:?} in {:.2}s",
            tool,
            result.exit_code,
            start.elapsed().as_secs_f64()
        );

        Ok(result)
    }
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    program: String,
    input: PathBuf,
    output: PathBuf,
    /// Arguments placed after -i
    output_args: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(program: impl Into<String>, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Seek after the input is opened (frame accurate).
    pub fn seek(self, seconds: u64) -> Self {
        self.output_arg("-ss").output_arg(seconds.to_string())
    }

    pub fn duration(self, seconds: u64) -> Self {
        self.output_arg("-t").output_arg(seconds.to_string())
    }

    /// Copy all streams without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    pub fn single_frame(self) -> Self {
        self.output_arg("-frames:v").output_arg("1")
    }

    pub fn build_args(&self) -> Vec<String> {
        // Overwrite the scratch output, log errors only
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());

        // Output file is always last
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    pub fn build(&self) -> ToolCommand {
        ToolCommand::new(self.program.clone()).args(self.build_args())
    }
}

/// Check that a tool is resolvable on PATH (or as a path).
pub fn check_tool(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::ToolNotFound(program.to_string()))
}
