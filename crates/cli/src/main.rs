// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! llvm-bolt wrapper binary entry point.

use std::io::Write;

use bolt_wrapper::config::Settings;
use bolt_wrapper::coordinator::{run, Invocation};
use bolt_wrapper::error::{Failure, CONFIG_EXIT_CODE, FAILURE_EXIT_CODE};
use bolt_wrapper::output_diagnostic::print_error;

#[tokio::main]
async fn main() {
    let invocation = Invocation::from_env();

    let settings = match std::env::current_dir()
        .map_err(|e| e.to_string())
        .and_then(|cwd| Settings::resolve(&cwd).map_err(|e| e.to_string()))
    {
        Ok(settings) => settings,
        Err(msg) => {
            print_error(msg);
            std::process::exit(CONFIG_EXIT_CODE);
        }
    };

    match run(&settings, &invocation).await {
        Ok(success) => {
            // Mirror the base run so callers see llvm-bolt's own output.
            if let Err(e) = mirror(&success.main.raw_stdout, &success.main.raw_stderr) {
                print_error(format_args!("Failed to forward base output: {e}"));
                std::process::exit(FAILURE_EXIT_CODE);
            }
            std::process::exit(success.exit_code());
        }
        Err(failure) => {
            if let Err(e) = report(&failure) {
                print_error(format_args!("Failed to write failure report: {e}"));
            }
            print_error(&failure.error);
            std::process::exit(failure.exit_code());
        }
    }
}

fn mirror(stdout: &[u8], stderr: &[u8]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(stdout)?;
    out.flush()?;
    let mut err = std::io::stderr().lock();
    err.write_all(stderr)?;
    err.flush()
}

/// Workspace path, then the mismatch report, on stdout.
fn report(failure: &Failure) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    if let Some(workspace) = &failure.workspace {
        writeln!(out, "{}", workspace.display())?;
    }
    if let Some(report) = failure.report() {
        write!(out, "{report}")?;
    }
    out.flush()
}
