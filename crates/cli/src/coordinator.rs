// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run coordination.
//!
//! One invocation runs the base and comparison builds on the same inputs,
//! compares exit codes and logs, records timing, then compares the output
//! binaries. The first fatal mismatch ends the invocation and keeps the
//! workspace; a clean run removes it and mirrors the base run.

use crate::args::{partition, relocate, OutputArgs, SplitArgs, BOLT_OUTPUT_FLAGS};
use crate::config::Settings;
use crate::error::{Failure, WrapperError};
use crate::output_diagnostic::{print_verbose, print_warning};
use crate::runner::{launch, RunMode, RunOutput, RunSide, RunnerError, ToolExit};
use crate::timing::{append_record, TimingRecord};
use crate::workspace::{
    headers_file, Workspace, HEADERS_FILE, STDERR_DIFF_FILE, STDOUT_DIFF_FILE, SUMMARY_FILE,
};
use bolt_wrapper_compare::{
    compare_outputs, unified_diff, BinaryMismatch, LineMismatch, LogComparator, OffsetLocation,
};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Trailing stderr lines left out of the comparison: the harness timing line.
pub const STDERR_SKIP_END: usize = 1;

/// What the wrapper was invoked as, and with which arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// File name the wrapper was started under, e.g. `llvm-bolt` or `perf2bolt`.
    pub alias: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(alias: impl Into<String>, args: Vec<OsString>) -> Self {
        Self {
            alias: alias.into(),
            args,
        }
    }

    /// Read the alias and arguments of the current process.
    pub fn from_env() -> Self {
        let mut args = std::env::args_os();
        let alias = args
            .next()
            .map(|argv0| {
                let path = Path::new(&argv0);
                path.file_name()
                    .unwrap_or(path.as_os_str())
                    .to_string_lossy()
                    .into_owned()
            })
            .unwrap_or_default();
        Self::new(alias, args.collect())
    }
}

/// Why an invocation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// Exit codes differ, or logs differ with `compare_output` on.
    ExitOrLogs {
        main_exit: ToolExit,
        cmp_exit: ToolExit,
        stdout: Option<LineMismatch>,
        stderr: Option<LineMismatch>,
    },
    /// Outputs differ and at least one is not an ELF file.
    Output { offset: u64 },
    /// Only one run produced its output binary.
    MissingOutput { side: RunSide, path: PathBuf },
    /// A structural header line differs.
    Headers(LineMismatch),
    /// Headers agree but bytes do not.
    Binaries {
        offset: u64,
        location: OffsetLocation,
    },
}

impl Mismatch {
    /// Contents of `summary.txt` or `headers.txt`.
    pub fn summary(&self) -> String {
        match self {
            Self::ExitOrLogs {
                main_exit,
                cmp_exit,
                stdout,
                stderr,
            } => {
                let mut summary = String::new();
                if main_exit != cmp_exit {
                    summary.push_str(&format!("exit:\nmain: {main_exit}\ncmp: {cmp_exit}\n"));
                }
                for mismatch in [stdout, stderr].into_iter().flatten() {
                    summary.push_str(&mismatch.to_string());
                }
                summary
            }
            Self::Output { offset } => format!("outputs differ at byte {offset}\n"),
            Self::MissingOutput { side, path } => {
                format!("{side} did not produce {}\n", path.display())
            }
            Self::Headers(mismatch) => mismatch.to_string(),
            Self::Binaries { offset, location } => format!("{offset}\n{location}\n"),
        }
    }

    /// Extra text printed on stdout after the workspace path.
    pub fn report(&self) -> Option<String> {
        match self {
            Self::Headers(_) | Self::Binaries { .. } => Some(self.summary()),
            _ => None,
        }
    }

    fn artifact(&self) -> &'static str {
        match self {
            Self::Headers(_) => HEADERS_FILE,
            _ => SUMMARY_FILE,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitOrLogs { .. } => write!(f, "exitcode or logs mismatch"),
            Self::Output { .. } => write!(f, "output mismatch"),
            Self::MissingOutput { side, .. } => {
                write!(f, "output mismatch: {side} produced no output")
            }
            Self::Headers(_) => write!(f, "headers mismatch"),
            Self::Binaries { .. } => write!(f, "binaries mismatch"),
        }
    }
}

/// A clean comparison. The base run is mirrored back to the caller.
#[derive(Debug)]
pub struct Success {
    pub main: RunOutput,
    /// Present when `keep_tmp` kept the workspace.
    pub workspace: Option<PathBuf>,
}

impl Success {
    /// Exit code the wrapper returns: the base run's own.
    pub fn exit_code(&self) -> i32 {
        self.main.exit.as_process_code()
    }
}

/// Run both builds and compare everything they produced.
pub async fn run(settings: &Settings, invocation: &Invocation) -> Result<Success, Failure> {
    let split = partition(&invocation.args, BOLT_OUTPUT_FLAGS);
    let workspace = Workspace::create()
        .map_err(|e| Failure::new(WrapperError::io(&std::env::temp_dir(), e)))?;

    match compare_runs(settings, invocation, &split, &workspace).await {
        Ok(main) => Ok(finish(settings, workspace, main)),
        Err(error) => Err(Failure::retaining(workspace, error)),
    }
}

async fn compare_runs(
    settings: &Settings,
    invocation: &Invocation,
    split: &SplitArgs,
    workspace: &Workspace,
) -> Result<RunOutput, WrapperError> {
    let cmp_outputs = relocate(&split.outputs, workspace.path());
    if settings.verbose {
        log_outputs(&split.outputs, &cmp_outputs);
    }

    let mode = RunMode::select(&invocation.alias, settings.no_minimize);
    let main_args = split.with_outputs(&split.outputs);
    let cmp_args = split.with_outputs(&cmp_outputs);
    let (main, cmp) = run_both(settings, mode, &main_args, &cmp_args).await?;

    let comparator = settings.log_comparator();
    check_logs(settings, &comparator, workspace, &main, &cmp)?;

    let main_binary = split.outputs.output_binary();
    let record = TimingRecord::from_runs(main_binary, &main.stderr, &cmp.stderr);
    append_record(&settings.timing_file, &record)
        .map_err(|e| WrapperError::io(&settings.timing_file, e))?;

    match (main_binary, cmp_outputs.output_binary()) {
        (Some(main_binary), Some(cmp_binary)) if !settings.skip_binary_cmp => {
            match check_binaries(settings, &comparator, workspace, main_binary, cmp_binary) {
                Ok(None) => {}
                Ok(Some(mismatch)) => {
                    save_mismatch(workspace, &mismatch, &main, &cmp)?;
                    return Err(mismatch.into());
                }
                Err(error) => {
                    save_logs(workspace, SUMMARY_FILE, format!("{error}\n"), &main, &cmp)?;
                    return Err(error);
                }
            }
        }
        _ if settings.verbose => print_verbose("binary comparison skipped"),
        _ => {}
    }

    Ok(main)
}

fn log_outputs(main: &OutputArgs, cmp: &OutputArgs) {
    for (flag, path) in main.iter() {
        let relocated = cmp.get(flag.name).unwrap_or(path);
        print_verbose(format_args!(
            "{}: {} (comparison: {})",
            flag.description,
            path.display(),
            relocated.display()
        ));
    }
}

async fn run_both(
    settings: &Settings,
    mode: RunMode,
    main_args: &[OsString],
    cmp_args: &[OsString],
) -> Result<(RunOutput, RunOutput), RunnerError> {
    let timeout = settings.timeout;
    if settings.run_sequentially {
        let main = launch(settings, RunSide::Main, &settings.base_bolt, main_args, mode)?
            .wait(timeout)
            .await?;
        let cmp = launch(settings, RunSide::Cmp, &settings.cmp_bolt, cmp_args, mode)?
            .wait(timeout)
            .await?;
        return Ok((main, cmp));
    }

    let main = launch(settings, RunSide::Main, &settings.base_bolt, main_args, mode)?;
    let cmp = launch(settings, RunSide::Cmp, &settings.cmp_bolt, cmp_args, mode)?;
    let (main, cmp) = tokio::join!(main.wait(timeout), cmp.wait(timeout));
    Ok((main?, cmp?))
}

/// Exit codes must always agree; log lines only when `compare_output` is on.
fn check_logs(
    settings: &Settings,
    comparator: &LogComparator,
    workspace: &Workspace,
    main: &RunOutput,
    cmp: &RunOutput,
) -> Result<(), WrapperError> {
    let stdout = comparator.compare(&main.stdout, &cmp.stdout, 0);
    let stderr = comparator.compare(&main.stderr, &cmp.stderr, STDERR_SKIP_END);
    let logs_differ = stdout.is_some() || stderr.is_some();

    if main.exit == cmp.exit && !(settings.compare_output && logs_differ) {
        if logs_differ && settings.verbose {
            print_verbose("logs differ; set compare_output to treat this as a mismatch");
        }
        return Ok(());
    }

    let mismatch = Mismatch::ExitOrLogs {
        main_exit: main.exit,
        cmp_exit: cmp.exit,
        stdout,
        stderr,
    };
    save_mismatch(workspace, &mismatch, main, cmp)?;
    save(workspace, STDOUT_DIFF_FILE, unified_diff(&main.stdout, &cmp.stdout))?;
    save(workspace, STDERR_DIFF_FILE, unified_diff(&main.stderr, &cmp.stderr))?;
    Err(mismatch.into())
}

fn save(workspace: &Workspace, name: &str, contents: String) -> Result<(), WrapperError> {
    workspace
        .write(name, contents)
        .map(drop)
        .map_err(|e| WrapperError::io(&workspace.path().join(name), e))
}

/// Write both runs' logs and the mismatch report into the workspace.
fn save_mismatch(
    workspace: &Workspace,
    mismatch: &Mismatch,
    main: &RunOutput,
    cmp: &RunOutput,
) -> Result<(), WrapperError> {
    save_logs(workspace, mismatch.artifact(), mismatch.summary(), main, cmp)
}

/// Write both runs' logs plus `report` under `name`.
fn save_logs(
    workspace: &Workspace,
    name: &str,
    report: String,
    main: &RunOutput,
    cmp: &RunOutput,
) -> Result<(), WrapperError> {
    workspace
        .write_run_logs(main, cmp)
        .map_err(|e| WrapperError::io(workspace.path(), e))?;
    save(workspace, name, report)
}

fn check_binaries(
    settings: &Settings,
    comparator: &LogComparator,
    workspace: &Workspace,
    main_binary: &Path,
    cmp_binary: &Path,
) -> Result<Option<Mismatch>, WrapperError> {
    let mismatch = match (main_binary.exists(), cmp_binary.exists()) {
        (false, false) => {
            if settings.verbose {
                print_verbose(format_args!(
                    "neither run produced {}; binary comparison skipped",
                    main_binary.display()
                ));
            }
            return Ok(None);
        }
        (false, true) => Mismatch::MissingOutput {
            side: RunSide::Main,
            path: main_binary.to_path_buf(),
        },
        (true, false) => Mismatch::MissingOutput {
            side: RunSide::Cmp,
            path: cmp_binary.to_path_buf(),
        },
        (true, true) => {
            let dumper = settings.header_dumper();
            match compare_outputs(main_binary, cmp_binary, &dumper, comparator)? {
                None => return Ok(None),
                Some(BinaryMismatch::NotElf { offset }) => Mismatch::Output { offset },
                Some(BinaryMismatch::Headers {
                    mismatch,
                    main_dump,
                    cmp_dump,
                }) => {
                    for (side, dump) in [(RunSide::Main, main_dump), (RunSide::Cmp, cmp_dump)] {
                        save(workspace, &headers_file(side), dump)?;
                    }
                    Mismatch::Headers(mismatch)
                }
                Some(BinaryMismatch::Bytes { offset, location }) => {
                    Mismatch::Binaries { offset, location }
                }
            }
        }
    };

    Ok(Some(mismatch))
}

fn finish(settings: &Settings, workspace: Workspace, main: RunOutput) -> Success {
    if settings.keep_tmp {
        let path = workspace.retain();
        if settings.verbose {
            print_verbose(format_args!("keeping {}", path.display()));
        }
        return Success {
            main,
            workspace: Some(path),
        };
    }

    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.remove() {
        print_warning(format_args!("Failed to remove {}: {e}", path.display()));
    }
    Success {
        main,
        workspace: None,
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
