//! CommandRunner — run one toolchain program and capture its text.
//!
//! Programs are spawned directly from an argument vector; no shell ever
//! sees the file path. stdout and stderr are read concurrently and appended
//! to a single buffer in arrival order, which is what callers see as "the
//! tool's output".

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::config::ValidatorConfig;
use crate::escape::quote_path;

const READ_CHUNK: usize = 4096;

/// Failures that keep a tool from producing output.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Error executing command: {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Error reading output of {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command timed out after {timeout:?}: {command}")]
    TimedOut { command: String, timeout: Duration },
}

/// One argument of a command, remembering whether it is a user path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandArg {
    value: String,
    is_path: bool,
}

/// A program invocation: argument vector plus optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<CommandArg>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append a plain argument (flag, class name, module name).
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(CommandArg {
            value: arg.into(),
            is_path: false,
        });
        self
    }

    /// Append a user-supplied path. Quoted in `display()`, passed verbatim.
    pub fn path_arg(mut self, path: impl Into<String>) -> Self {
        self.args.push(CommandArg {
            value: path.into(),
            is_path: true,
        });
        self
    }

    /// Run the program from this directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument vector handed to the OS.
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.value.as_str()).collect()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Shell-like rendering for logs and messages, with paths quoted.
    ///
    /// `CommandSpec::new("java").arg("Hello").current_dir("src")` renders
    /// as `cd "src" && java Hello`.
    pub fn display(&self) -> String {
        let mut line = String::new();
        if let Some(dir) = &self.current_dir {
            line.push_str("cd ");
            line.push_str(&quote_path(&dir.to_string_lossy()));
            line.push_str(" && ");
        }
        line.push_str(&self.program);
        for arg in &self.args {
            line.push(' ');
            if arg.is_path {
                line.push_str(&quote_path(&arg.value));
            } else {
                line.push_str(&arg.value);
            }
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Text a tool produced, stdout and stderr interleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub text: String,
    /// Exit code, when the platform reports one. Not used for verdicts.
    pub exit_code: Option<i32>,
    /// True when the output cap dropped bytes.
    pub truncated: bool,
}

impl CapturedOutput {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Spawns toolchain programs. Cheap to clone; holds only limits.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
    max_output_bytes: Option<usize>,
}

impl CommandRunner {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            timeout: config.timeout,
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Run `spec` to completion and return its merged output.
    ///
    /// Blocks the calling task until the program exits, or until the
    /// configured timeout, in which case the program is killed.
    pub async fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput, RunError> {
        let command = spec.display();
        tracing::debug!(%command, "spawning");

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = spec.working_dir() {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| RunError::Spawn {
            command: command.clone(),
            source,
        })?;

        let collect = collect_merged(child, &command, self.max_output_bytes);
        let output = match self.timeout {
            // Dropping the collector drops the child, and kill_on_drop reaps it.
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(%command, ?limit, "tool timed out, killed");
                    return Err(RunError::TimedOut {
                        command,
                        timeout: limit,
                    });
                }
            },
            None => collect.await?,
        };

        tracing::debug!(
            %command,
            exit_code = ?output.exit_code,
            bytes = output.text.len(),
            truncated = output.truncated,
            "tool finished"
        );
        Ok(output)
    }
}

/// Read stdout and stderr until both close, then wait for exit.
async fn collect_merged(
    mut child: Child,
    command: &str,
    max_bytes: Option<usize>,
) -> Result<CapturedOutput, RunError> {
    let io_err = |source| RunError::Io {
        command: command.to_string(),
        source,
    };

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut stdout_open = stdout.is_some();
    let mut stderr_open = stderr.is_some();
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let mut merged = MergedOutput::new(max_bytes);

    while stdout_open || stderr_open {
        tokio::select! {
            read = read_some(&mut stdout, &mut out_buf), if stdout_open => {
                match read.map_err(io_err)? {
                    0 => stdout_open = false,
                    n => merged.push(&out_buf[..n]),
                }
            }
            read = read_some(&mut stderr, &mut err_buf), if stderr_open => {
                match read.map_err(io_err)? {
                    0 => stderr_open = false,
                    n => merged.push(&err_buf[..n]),
                }
            }
        }
    }

    let status = child.wait().await.map_err(io_err)?;
    let (text, truncated) = merged.finish();
    Ok(CapturedOutput {
        text,
        exit_code: status.code(),
        truncated,
    })
}

async fn read_some<R: AsyncRead + Unpin>(reader: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize> {
    match reader {
        Some(r) => r.read(buf).await,
        None => Ok(0),
    }
}

/// Arrival-order buffer with an optional byte cap.
struct MergedOutput {
    bytes: Vec<u8>,
    cap: Option<usize>,
    dropped: usize,
}

impl MergedOutput {
    fn new(cap: Option<usize>) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
            dropped: 0,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        let room = match self.cap {
            Some(cap) => cap.saturating_sub(self.bytes.len()),
            None => chunk.len(),
        };
        let keep = room.min(chunk.len());
        self.bytes.extend_from_slice(&chunk[..keep]);
        self.dropped += chunk.len() - keep;
    }

    fn finish(self) -> (String, bool) {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        let truncated = self.dropped > 0;
        if truncated {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&format!(
                "[output truncated after {} bytes]\n",
                self.bytes.len()
            ));
        }
        (text, truncated)
    }
}
