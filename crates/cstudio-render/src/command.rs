//! Remotion CLI command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::progress::{parse_progress_line, ProgressCallback};

/// Stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Builder for `remotion render` invocations.
#[derive(Debug, Clone)]
pub struct RemotionCommand {
    /// Bundle directory or serve URL
    serve_url: String,
    /// Composition id inside the bundle
    composition: String,
    /// Output file path
    output: PathBuf,
    /// Input props passed to the composition
    props: Option<serde_json::Value>,
    codec: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    /// Number of frames to render, starting at frame 0
    frames: Option<u32>,
    concurrency: Option<u32>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl RemotionCommand {
    /// Create a new render command.
    pub fn new(serve_url: impl Into<String>, composition: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self {
            serve_url: serve_url.into(),
            composition: composition.into(),
            output: output.as_ref().to_path_buf(),
            props: None,
            codec: None,
            width: None,
            height: None,
            frames: None,
            concurrency: None,
            overwrite: true,
        }
    }

    /// Set input props.
    pub fn props(mut self, props: serde_json::Value) -> Self {
        self.props = Some(props);
        self
    }

    /// Set output codec.
    pub fn codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    /// Override composition dimensions.
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Render exactly `frames` frames.
    pub fn frames(mut self, frames: u32) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Set render concurrency.
    pub fn concurrency(mut self, concurrency: Option<u32>) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Output file path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments (after the CLI prefix).
    pub fn build_args(&self) -> RenderResult<Vec<String>> {
        let mut args = vec![
            "render".to_string(),
            self.serve_url.clone(),
            self.composition.clone(),
            self.output.to_string_lossy().to_string(),
        ];

        if let Some(props) = &self.props {
            args.push(format!("--props={}", serde_json::to_string(props)?));
        }
        if let Some(codec) = &self.codec {
            args.push(format!("--codec={}", codec));
        }
        if let Some(width) = self.width {
            args.push(format!("--width={}", width));
        }
        if let Some(height) = self.height {
            args.push(format!("--height={}", height));
        }
        if let Some(frames) = self.frames.filter(|f| *f > 0) {
            args.push(format!("--frames=0-{}", frames - 1));
        }
        if let Some(concurrency) = self.concurrency {
            args.push(format!("--concurrency={}", concurrency));
        }
        if self.overwrite {
            args.push("--overwrite".to_string());
        }

        Ok(args)
    }
}

/// Runs Remotion CLI subcommands, streaming progress from stdout.
#[derive(Debug, Clone)]
pub struct RemotionRunner {
    program: String,
    prefix: Vec<String>,
}

impl RemotionRunner {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            program: config.program().to_string(),
            prefix: config.prefix_args().to_vec(),
        }
    }

    /// Resolve the CLI program on PATH.
    pub fn check(&self) -> RenderResult<PathBuf> {
        check_program(&self.program)
    }

    /// Run a render command, reporting progress as 0.0-1.0 fractions.
    pub async fn render(&self, cmd: &RemotionCommand, on_progress: ProgressCallback) -> RenderResult<()> {
        let args = cmd.build_args()?;
        self.run(&args, Some(on_progress)).await
    }

    /// Run an arbitrary subcommand (e.g. `bundle`).
    pub async fn run(&self, args: &[String], on_progress: Option<ProgressCallback>) -> RenderResult<()> {
        let program = self.check()?;

        let mut full_args = self.prefix.clone();
        full_args.extend_from_slice(args);
        debug!("Running Remotion: {} {}", self.program, full_args.join(" "));

        let mut child = Command::new(program)
            .args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RenderError::render_failed("stdout not captured", None, None))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RenderError::render_failed("stderr not captured", None, None))?;

        // Progress can show up on either stream depending on the CLI version.
        let stdout_task = tokio::spawn(read_progress(stdout, on_progress.clone()));
        let stderr_task = tokio::spawn(read_progress(stderr, on_progress));

        let status = child.wait().await?;
        let _ = stdout_task.await;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if status.success() {
            return Ok(());
        }

        let tail = stderr_tail.join("\n");
        let message = stderr_tail
            .iter()
            .rev()
            .find(|line| line.to_lowercase().contains("error"))
            .or_else(|| stderr_tail.last())
            .cloned()
            .unwrap_or_else(|| format!("Remotion exited with status {:?}", status.code()));
        warn!(exit_code = ?status.code(), "Remotion command failed: {}", message);

        Err(RenderError::render_failed(
            message,
            (!tail.is_empty()).then_some(tail),
            status.code(),
        ))
    }
}

/// Forward progress lines and keep the last few lines for error messages.
async fn read_progress<R>(stream: R, on_progress: Option<ProgressCallback>) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream).lines();
    let mut tail = Vec::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = reader.next_line().await {
        // The CLI redraws progress bars with carriage returns.
        for segment in line.split('\r') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            if let (Some(cb), Some(progress)) = (&on_progress, parse_progress_line(segment)) {
                cb(progress.fraction());
                continue;
            }
            if tail.len() == STDERR_TAIL_LINES {
                tail.remove(0);
            }
            tail.push(segment.to_string());
        }
    }

    tail
}

/// Check if a program is available.
pub fn check_program(program: &str) -> RenderResult<PathBuf> {
    which::which(program).map_err(|_| RenderError::BinaryNotFound(program.to_string()))
}
