// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic output helpers for consistent error/warning formatting.
//!
//! Everything goes to stderr: the wrapper's stdout is reserved for the
//! workspace path, mismatch reports, and the mirrored base-run output.

use std::io::{self, IsTerminal, Write};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Severity of a diagnostic line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Error,
    Warning,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }

    fn colour(self) -> &'static str {
        match self {
            Self::Error => RED,
            Self::Warning => YELLOW,
        }
    }
}

/// Print an error message to stderr, in red on a terminal.
pub fn print_error(msg: impl std::fmt::Display) {
    let stderr = io::stderr();
    let is_tty = stderr.is_terminal();
    write_diagnostic(&mut stderr.lock(), Level::Error, msg, is_tty);
}

/// Print a warning message to stderr, in yellow on a terminal.
pub fn print_warning(msg: impl std::fmt::Display) {
    let stderr = io::stderr();
    let is_tty = stderr.is_terminal();
    write_diagnostic(&mut stderr.lock(), Level::Warning, msg, is_tty);
}

fn write_diagnostic<W: Write>(
    writer: &mut W,
    level: Level,
    msg: impl std::fmt::Display,
    is_terminal: bool,
) {
    let label = level.label();
    if is_terminal {
        let _ = writeln!(writer, "{}{label}: {msg}{RESET}", level.colour());
    } else {
        let _ = writeln!(writer, "{label}: {msg}");
    }
}

/// Print a verbose progress message to stderr.
///
/// Only called when the `verbose` setting is on.
pub fn print_verbose(msg: impl std::fmt::Display) {
    write_verbose(&mut io::stderr(), msg);
}

fn write_verbose<W: Write>(writer: &mut W, msg: impl std::fmt::Display) {
    let _ = writeln!(writer, "bolt-wrapper: {}", msg);
}

#[cfg(test)]
#[path = "output_diagnostic_tests.rs"]
mod tests;
