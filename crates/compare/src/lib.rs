// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Comparison primitives for differential llvm-bolt runs.
//!
//! This crate compares the two halves of a wrapper invocation: the text logs
//! written by each run (with tolerance for known-noisy lines) and the output
//! binaries they produce (bytes first, then ELF structural headers).

mod binary;
mod error;
mod headers;
mod log;
mod noise;

pub use binary::{compare_outputs, first_difference, has_elf_magic, BinaryMismatch, ELF_MAGIC};
pub use error::CompareError;
pub use headers::{locate_offset, HeaderDumper, OffsetLocation};
pub use log::{unified_diff, LineCountPolicy, LineMismatch, LogComparator, END_OF_LOG};
pub use noise::{NoisePatterns, DEFAULT_NOISE_PATTERNS};
