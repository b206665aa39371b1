// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation scratch directory.
//!
//! The comparison run writes its outputs here. On a mismatch the captured
//! logs and reports are added and the directory is kept for inspection.

use crate::runner::{RunOutput, RunSide};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory name prefix, followed by a random suffix.
pub const WORKSPACE_PREFIX: &str = "llvm-bolt-wrapper.";

pub const SUMMARY_FILE: &str = "summary.txt";
pub const HEADERS_FILE: &str = "headers.txt";
pub const STDOUT_DIFF_FILE: &str = "stdout.diff";
pub const STDERR_DIFF_FILE: &str = "stderr.diff";

/// `main_bolt.stdout`, `cmp_bolt.stderr`, ...
pub fn log_file(side: RunSide, stream: &str) -> String {
    format!("{}.{stream}", side.label())
}

/// `main_bolt.headers` or `cmp_bolt.headers`.
pub fn headers_file(side: RunSide) -> String {
    log_file(side, "headers")
}

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory under the system temp dir.
    pub fn create() -> io::Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    pub fn create_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write one artifact, replacing any previous content.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Persist both runs' stdout and stderr.
    pub fn write_run_logs(&self, main: &RunOutput, cmp: &RunOutput) -> io::Result<()> {
        for (side, output) in [(RunSide::Main, main), (RunSide::Cmp, cmp)] {
            self.write(&log_file(side, "stdout"), &output.raw_stdout)?;
            self.write(&log_file(side, "stderr"), &output.raw_stderr)?;
        }
        Ok(())
    }

    /// Keep the directory on disk and return its path.
    pub fn retain(self) -> PathBuf {
        self.dir.keep()
    }

    /// Delete the directory and everything in it.
    pub fn remove(self) -> io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
