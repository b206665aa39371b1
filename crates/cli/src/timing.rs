// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Timing log records.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Elapsed seconds and peak RSS reported by the harness, kept as printed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingSample {
    pub elapsed: String,
    pub peak_kb: String,
}

impl TimingSample {
    /// Parse the harness line at the end of a run's stderr.
    ///
    /// Returns `None` when the last line is not `<seconds> <kb>`, e.g. when the
    /// run was killed before the harness could report.
    pub fn from_stderr(stderr: &str) -> Option<Self> {
        let line = stderr.lines().last()?;
        let mut tokens = line.split_whitespace();
        let elapsed = tokens.next()?;
        let peak_kb = tokens.next()?;
        if tokens.next().is_some() || elapsed.parse::<f64>().is_err() || peak_kb.parse::<u64>().is_err() {
            return None;
        }
        Some(Self {
            elapsed: elapsed.to_string(),
            peak_kb: peak_kb.to_string(),
        })
    }
}

impl fmt::Display for TimingSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.elapsed, self.peak_kb)
    }
}

/// One line of the timing log: `<output>; <t> <m>; <t> <m>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingRecord {
    /// Base run's output binary; empty when no `-o` was given.
    pub output: Option<PathBuf>,
    pub main: Option<TimingSample>,
    pub cmp: Option<TimingSample>,
}

impl TimingRecord {
    pub fn from_runs(output: Option<&Path>, main_stderr: &str, cmp_stderr: &str) -> Self {
        Self {
            output: output.map(Path::to_path_buf),
            main: TimingSample::from_stderr(main_stderr),
            cmp: TimingSample::from_stderr(cmp_stderr),
        }
    }
}

fn sample(f: &mut fmt::Formatter<'_>, sample: &Option<TimingSample>) -> fmt::Result {
    match sample {
        Some(sample) => write!(f, "{sample}"),
        None => write!(f, "- -"),
    }
}

impl fmt::Display for TimingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(output) = &self.output {
            write!(f, "{}", output.display())?;
        }
        write!(f, "; ")?;
        sample(f, &self.main)?;
        write!(f, "; ")?;
        sample(f, &self.cmp)
    }
}

/// Append `record` as one line, creating the log if needed.
pub fn append_record(path: &Path, record: &TimingRecord) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format!("{record}\n").as_bytes())
}

#[cfg(test)]
#[path = "timing_tests.rs"]
mod tests;
