// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type and the failure handed back to `main`.

use crate::config::SettingsError;
use crate::coordinator::Mismatch;
use crate::runner::RunnerError;
use crate::workspace::Workspace;
use bolt_wrapper_compare::CompareError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit code for an unusable settings file.
pub const CONFIG_EXIT_CODE: i32 = 2;
/// Exit code for mismatches and runtime failures.
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Debug, Error)]
pub enum WrapperError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error("Failed to write {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("{0}")]
    Mismatch(Mismatch),
}

impl WrapperError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Settings(_) => CONFIG_EXIT_CODE,
            _ => FAILURE_EXIT_CODE,
        }
    }
}

impl From<Mismatch> for WrapperError {
    fn from(mismatch: Mismatch) -> Self {
        Self::Mismatch(mismatch)
    }
}

/// A run that did not succeed, with the retained workspace if one exists.
#[derive(Debug)]
pub struct Failure {
    pub workspace: Option<PathBuf>,
    pub error: WrapperError,
}

impl Failure {
    /// Failure before a workspace exists.
    pub fn new(error: impl Into<WrapperError>) -> Self {
        Self {
            workspace: None,
            error: error.into(),
        }
    }

    /// Failure that keeps `workspace` on disk for inspection.
    pub fn retaining(workspace: Workspace, error: impl Into<WrapperError>) -> Self {
        Self {
            workspace: Some(workspace.retain()),
            error: error.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }

    /// Text printed on stdout after the workspace path.
    pub fn report(&self) -> Option<String> {
        match &self.error {
            WrapperError::Mismatch(mismatch) => mismatch.report(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
