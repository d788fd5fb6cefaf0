//! External tool execution.
//!
//! Runs a command-line tool as a child process with a hard timeout and a
//! ceiling on captured stdout/stderr. The child is killed when the timeout
//! fires, when output overflows, or when the future is dropped.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::error::ConversionError;

/// One invocation of an external tool.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Label used in logs and error messages (e.g. `pdftk`).
    pub tool: String,
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, passed verbatim (no shell).
    pub args: Vec<OsString>,
    /// Hard wall-clock limit.
    pub timeout: Duration,
    /// Ceiling for each of stdout and stderr.
    pub max_output_bytes: usize,
}

impl ToolInvocation {
    /// Start building an invocation of `program`.
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
            max_output_bytes: 10 * 1024 * 1024,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the captured-output ceiling.
    pub fn max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// Printable command line, for logging only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| {
                let part = part.to_string_lossy();
                if part.contains(char::is_whitespace) {
                    format!("\"{part}\"")
                } else {
                    part.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: Vec<u8>,
    /// Wall-clock duration.
    pub duration_ms: u64,
}

/// Executor for external command-line tools.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    /// Service log level; command lines are logged when `> 1`.
    log_level: u8,
}

impl ToolExecutor {
    /// Create a new executor.
    pub fn new(log_level: u8) -> Self {
        Self { log_level }
    }

    /// Run the tool to completion.
    ///
    /// Fails with [`ConversionError::ToolFailed`] when the process cannot be
    /// spawned or exits non-zero (carrying trimmed stderr when present),
    /// [`ConversionError::ToolTimeout`] on timeout, and
    /// [`ConversionError::ToolOutputExceeded`] when captured output grows
    /// past the ceiling.
    pub async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ConversionError> {
        let start = Instant::now();
        let tool = invocation.tool.as_str();

        if self.log_level > 1 {
            info!(tool, command = %invocation.command_line(), "Executing external tool");
        }

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!(tool, program = %invocation.program.display(), error = %e, "Failed to spawn external tool");
                ConversionError::ToolFailed {
                    tool: tool.to_string(),
                    message: e.to_string(),
                }
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = invocation.max_output_bytes;

        let run = async {
            tokio::try_join!(
                read_capped(stdout, limit, tool),
                read_capped(stderr, limit, tool),
                async {
                    child.wait().await.map_err(|e| ConversionError::ToolFailed {
                        tool: tool.to_string(),
                        message: e.to_string(),
                    })
                },
            )
        };

        let result = tokio::time::timeout(invocation.timeout, run).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok((stdout, stderr, status))) => {
                if !status.success() {
                    let message = diagnostic(&stderr, status);
                    error!(
                        tool,
                        status = %status,
                        stderr = %message.chars().take(500).collect::<String>(),
                        "External tool failed"
                    );
                    return Err(ConversionError::ToolFailed {
                        tool: tool.to_string(),
                        message,
                    });
                }

                if self.log_level > 1 {
                    info!(tool, duration_ms, "External tool completed");
                }

                Ok(ToolOutput {
                    stdout,
                    stderr,
                    duration_ms,
                })
            }
            Ok(Err(e)) => {
                let _ = child.start_kill();
                error!(tool, error = %e, "External tool aborted");
                Err(e)
            }
            Err(_) => {
                let _ = child.start_kill();
                warn!(
                    tool,
                    timeout_seconds = invocation.timeout.as_secs(),
                    "External tool timed out"
                );
                Err(ConversionError::ToolTimeout {
                    tool: tool.to_string(),
                    timeout_seconds: invocation.timeout.as_secs(),
                })
            }
        }
    }

    /// Check if a program is available, either as an existing path or on
    /// the system `PATH`.
    pub async fn is_available(&self, program: &Path) -> bool {
        if program.components().count() > 1 {
            return tokio::fs::metadata(program)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
        }

        let locator = if cfg!(target_os = "windows") {
            "where"
        } else {
            "which"
        };

        match Command::new(locator)
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}

async fn read_capped<R>(
    reader: Option<R>,
    limit: usize,
    tool: &str,
) -> Result<Vec<u8>, ConversionError>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };

    let mut buf = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .await
        .map_err(|e| ConversionError::ToolFailed {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;

    if buf.len() > limit {
        return Err(ConversionError::ToolOutputExceeded {
            tool: tool.to_string(),
            limit,
        });
    }

    Ok(buf)
}

fn diagnostic(stderr: &[u8], status: ExitStatus) -> String {
    let text = String::from_utf8_lossy(stderr).trim().to_string();
    if text.is_empty() {
        format!("process exited with {status}")
    } else {
        text
    }
}
