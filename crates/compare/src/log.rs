// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Positional log comparison.

use crate::noise::NoisePatterns;
use similar::TextDiff;
use std::fmt;

/// Placeholder for the missing side when line counts differ under
/// [`LineCountPolicy::Strict`].
pub const END_OF_LOG: &str = "<end of log>";

/// The first pair of lines that differ and are not tolerated as noise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMismatch {
    pub main: String,
    pub cmp: String,
}

impl LineMismatch {
    pub fn new(main: impl Into<String>, cmp: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            cmp: cmp.into(),
        }
    }
}

impl fmt::Display for LineMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "main:\n{}\ncmp:\n{}\n", self.main, self.cmp)
    }
}

/// How to treat logs of different lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCountPolicy {
    /// Only lines present on both sides are compared.
    #[default]
    Lenient,
    /// A log that runs longer than the other is a mismatch.
    Strict,
}

/// Line-by-line comparator with noise tolerance.
#[derive(Clone, Debug, Default)]
pub struct LogComparator {
    noise: NoisePatterns,
    policy: LineCountPolicy,
}

impl LogComparator {
    pub fn new(noise: NoisePatterns) -> Self {
        Self {
            noise,
            policy: LineCountPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LineCountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn noise(&self) -> &NoisePatterns {
        &self.noise
    }

    pub fn policy(&self) -> LineCountPolicy {
        self.policy
    }

    /// Compare two logs, ignoring the last `skip_end` lines of each.
    ///
    /// Returns the first differing pair that no noise pattern tolerates.
    pub fn compare(&self, main: &str, cmp: &str, skip_end: usize) -> Option<LineMismatch> {
        let main_lines: Vec<&str> = main.lines().collect();
        let cmp_lines: Vec<&str> = cmp.lines().collect();
        let main_len = main_lines.len().saturating_sub(skip_end);
        let cmp_len = cmp_lines.len().saturating_sub(skip_end);

        let paired = main_lines[..main_len].iter().zip(&cmp_lines[..cmp_len]);
        for (lhs, rhs) in paired {
            if lhs != rhs && !self.noise.tolerates(lhs, rhs) {
                return Some(LineMismatch::new(*lhs, *rhs));
            }
        }

        if self.policy == LineCountPolicy::Strict && main_len != cmp_len {
            let at = main_len.min(cmp_len);
            let side = |lines: &[&str], len: usize| {
                if at < len {
                    lines[at].to_string()
                } else {
                    END_OF_LOG.to_string()
                }
            };
            return Some(LineMismatch::new(
                side(&main_lines, main_len),
                side(&cmp_lines, cmp_len),
            ));
        }

        None
    }
}

/// Unified diff of two logs, labelled `main_bolt` and `cmp_bolt`.
pub fn unified_diff(main: &str, cmp: &str) -> String {
    TextDiff::from_lines(main, cmp)
        .unified_diff()
        .context_radius(3)
        .header("main_bolt", "cmp_bolt")
        .to_string()
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
