// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! llvm-bolt differential wrapper
//!
//! Installed in place of `llvm-bolt` (or `perf2bolt`), the wrapper runs a base
//! and a comparison build of the tool on the same arguments, compares exit
//! codes, logs and output binaries, and appends both runs' timing to a log.
//! On a match it behaves exactly like the base build; on a mismatch it keeps
//! the captured artifacts in a temporary directory and fails.

pub mod args;
pub mod config;
pub mod coordinator;
pub mod env;
pub mod error;
pub mod output_diagnostic;
pub mod runner;
pub mod timing;
pub mod workspace;
