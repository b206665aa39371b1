// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process runner.
//!
//! Each llvm-bolt run is spawned under a timing harness in its own process
//! group. Both pipes are drained by background tasks so a chatty child never
//! blocks on a full pipe while we wait on it.

use crate::config::Settings;
use crate::output_diagnostic::{print_verbose, print_warning};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Invocation name that selects perf2bolt behaviour.
pub const PERF2BOLT_ALIAS: &str = "perf2bolt";

/// Harness format: elapsed wall-clock seconds and peak RSS in KB.
pub const TIME_FORMAT: &str = "%e %M";

const AGGREGATE_ONLY_ARGS: &[&str] = &["-aggregate-only"];
const MINIMIZE_DIFFS_ARGS: &[&str] = &["-bolt-info=0"];

/// Extra arguments appended to both runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Invoked as `perf2bolt`: only aggregate the profile.
    AggregateOnly,
    /// Suppress diagnostics known to differ between builds.
    MinimizeDiffs,
    /// Forward arguments untouched.
    Plain,
}

impl RunMode {
    /// Select the mode from the wrapper's invocation alias.
    pub fn select(alias: &str, no_minimize: bool) -> Self {
        if alias == PERF2BOLT_ALIAS {
            Self::AggregateOnly
        } else if no_minimize {
            Self::Plain
        } else {
            Self::MinimizeDiffs
        }
    }

    pub fn extra_args(self) -> &'static [&'static str] {
        match self {
            Self::AggregateOnly => AGGREGATE_ONLY_ARGS,
            Self::MinimizeDiffs => MINIMIZE_DIFFS_ARGS,
            Self::Plain => &[],
        }
    }
}

/// Which of the two runs a process belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunSide {
    Main,
    Cmp,
}

impl RunSide {
    /// Prefix of the artifacts written for this run.
    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "main_bolt",
            Self::Cmp => "cmp_bolt",
        }
    }
}

impl fmt::Display for RunSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to launch {}: {message}", program.display())]
    Spawn {
        program: std::path::PathBuf,
        message: String,
    },

    #[error("Failed to wait for {side}: {message}")]
    Wait { side: RunSide, message: String },

    #[error("Failed to capture {side} output: {message}")]
    Capture { side: RunSide, message: String },
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolExit {
    Code(i32),
    Signal(i32),
    Unknown,
}

impl ToolExit {
    /// Exit code the wrapper uses to mirror this status.
    pub fn as_process_code(self) -> i32 {
        match self {
            Self::Code(code) => code,
            Self::Signal(signal) => 128 + signal,
            Self::Unknown => 1,
        }
    }
}

impl From<ExitStatus> for ToolExit {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Self::Code(code),
            (None, Some(signal)) => Self::Signal(signal),
            (None, None) => Self::Unknown,
        }
    }
}

impl fmt::Display for ToolExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {code}"),
            Self::Signal(signal) => write!(f, "signal {signal}"),
            Self::Unknown => write!(f, "unknown status"),
        }
    }
}

/// Everything captured from one run.
///
/// The text fields are lossy UTF-8 views used for comparison; the raw bytes
/// are what gets mirrored and saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    /// Ends with the harness timing line unless the run was killed.
    pub stderr: String,
    pub raw_stdout: Vec<u8>,
    pub raw_stderr: Vec<u8>,
    pub exit: ToolExit,
    pub timed_out: bool,
}

impl RunOutput {
    pub fn new(raw_stdout: Vec<u8>, raw_stderr: Vec<u8>, exit: ToolExit, timed_out: bool) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&raw_stdout).into_owned(),
            stderr: String::from_utf8_lossy(&raw_stderr).into_owned(),
            raw_stdout,
            raw_stderr,
            exit,
            timed_out,
        }
    }
}

type Capture = JoinHandle<io::Result<Vec<u8>>>;

/// A launched run whose output is being collected.
#[derive(Debug)]
pub struct RunningTool {
    side: RunSide,
    child: Child,
    stdout: Capture,
    stderr: Capture,
}

/// Spawn `exe` under the timing harness. Returns as soon as the process is
/// running.
pub fn launch(
    settings: &Settings,
    side: RunSide,
    exe: &Path,
    args: &[OsString],
    mode: RunMode,
) -> Result<RunningTool, RunnerError> {
    let mut command = Command::new(&settings.time_tool);
    command
        .arg("-f")
        .arg(TIME_FORMAT)
        .arg(exe)
        .args(args)
        .args(mode.extra_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    if settings.verbose {
        print_verbose(format_args!(
            "{side}: {}",
            command_line(&settings.time_tool, exe, args, mode)
        ));
    }

    let mut child = command.spawn().map_err(|e| RunnerError::Spawn {
        program: settings.time_tool.clone(),
        message: e.to_string(),
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    Ok(RunningTool {
        side,
        child,
        stdout,
        stderr,
    })
}

fn command_line(time_tool: &Path, exe: &Path, args: &[OsString], mode: RunMode) -> String {
    let mut parts = vec![
        time_tool.display().to_string(),
        "-f".to_string(),
        format!("'{TIME_FORMAT}'"),
        exe.display().to_string(),
    ];
    parts.extend(args.iter().map(|arg| arg.to_string_lossy().into_owned()));
    parts.extend(mode.extra_args().iter().map(|arg| arg.to_string()));
    parts.join(" ")
}

fn drain<R>(pipe: Option<R>) -> Capture
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

impl RunningTool {
    pub fn side(&self) -> RunSide {
        self.side
    }

    /// Wait for the run to finish.
    ///
    /// On timeout the whole process group is killed and whatever was captured
    /// so far is returned with `timed_out` set.
    pub async fn wait(self, timeout: Duration) -> Result<RunOutput, RunnerError> {
        let Self {
            side,
            mut child,
            stdout,
            stderr,
        } = self;
        let wait_error = |e: io::Error| RunnerError::Wait {
            side,
            message: e.to_string(),
        };

        let (status, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => (status.map_err(wait_error)?, false),
            Err(_) => {
                print_warning(format_args!(
                    "{side} did not finish within {}s, killing it",
                    timeout.as_secs()
                ));
                if let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) {
                    let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
                }
                let _ = child.start_kill();
                (child.wait().await.map_err(wait_error)?, true)
            }
        };

        Ok(RunOutput::new(
            collect(side, stdout).await?,
            collect(side, stderr).await?,
            ToolExit::from(status),
            timed_out,
        ))
    }
}

async fn collect(side: RunSide, capture: Capture) -> Result<Vec<u8>, RunnerError> {
    let capture_error = |message: String| RunnerError::Capture { side, message };
    capture
        .await
        .map_err(|e| capture_error(e.to_string()))?
        .map_err(|e| capture_error(e.to_string()))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
