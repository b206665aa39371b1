// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while comparing output binaries.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse ELF file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: object::Error,
    },

    #[error("{} is not an ELF file", path.display())]
    NotElf { path: PathBuf },

    #[error("Failed to run header dumper {}: {message}", tool.display())]
    Dumper { tool: PathBuf, message: String },
}

impl CompareError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: object::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
