// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The wrapper is configured through its settings file; these variables are
//! overrides for one-off runs. Use these accessors instead of calling
//! `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

pub use names::*;

use std::path::PathBuf;

/// `BOLT_WRAPPER_CONFIG`: Settings file to read instead of
/// `llvm-bolt-wrapper.ini` in the working directory.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(names::BOLT_WRAPPER_CONFIG)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `BOLT_WRAPPER_TIMEOUT_SECS`: Per-run timeout override.
pub fn timeout_secs() -> Option<u64> {
    var_u64(names::BOLT_WRAPPER_TIMEOUT_SECS)
}

/// `BOLT_WRAPPER_VERBOSE`: Force verbose logging when set to a non-empty value.
pub fn verbose() -> bool {
    std::env::var(names::BOLT_WRAPPER_VERBOSE).is_ok_and(|value| !value.is_empty() && value != "0")
}

fn var_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
