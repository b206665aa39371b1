// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Expected-noise line patterns.
//!
//! Some log lines legitimately differ between two builds of llvm-bolt: the
//! version banner, the echoed command line, debug-only diagnostics. A line
//! pair is tolerated when a single pattern matches both sides.

use regex::Regex;

/// Patterns tolerated out of the box.
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    "BOLT-INFO: BOLT version",
    "^Args: ",
    "^BOLT-DEBUG:",
    "BOLT-INFO:.*data.*output data",
    "WARNING: reading perf data directly",
];

/// Ordered list of compiled noise patterns.
#[derive(Clone, Debug)]
pub struct NoisePatterns {
    patterns: Vec<Regex>,
}

impl NoisePatterns {
    /// An empty list that tolerates nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// The built-in llvm-bolt noise list.
    pub fn builtin() -> Self {
        Self {
            patterns: DEFAULT_NOISE_PATTERNS
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        }
    }

    /// Compile a list of patterns, failing on the first invalid one.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut noise = Self::empty();
        noise.extend(patterns)?;
        Ok(noise)
    }

    /// Append patterns after the existing ones.
    pub fn extend<I, S>(&mut self, patterns: I) -> Result<(), regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.patterns.push(Regex::new(pattern.as_ref())?);
        }
        Ok(())
    }

    /// Whether some pattern matches both lines.
    pub fn tolerates(&self, lhs: &str, rhs: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.is_match(lhs) && pattern.is_match(rhs))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl Default for NoisePatterns {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "noise_tests.rs"]
mod tests;
