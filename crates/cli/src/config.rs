// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wrapper settings, read once from `llvm-bolt-wrapper.ini`.
//!
//! ```ini
//! [config]
//! # mandatory
//! base_bolt = /full/path/to/llvm-bolt.real
//! cmp_bolt = /full/path/to/other/llvm-bolt
//! # optional, default to false; a bare key means true
//! verbose
//! keep_tmp
//! no_minimize
//! run_sequentially
//! compare_output
//! skip_binary_cmp
//! strict_line_count
//! # optional, defaults to timing.log in the working directory
//! timing_file = timing1.log
//! timeout = 9000
//! time_tool = /usr/bin/time
//! readelf = /usr/bin/readelf
//!
//! [skip_match]
//! elapsed = ^BOLT-INFO: elapsed
//! ```
//!
//! Keys are case-insensitive and the last occurrence wins. Indented lines
//! continue the previous value. Each `[skip_match]` entry names one extra
//! noise regex; everything after the first `=` or `:` is the pattern.

use crate::env;
use bolt_wrapper_compare::{HeaderDumper, LineCountPolicy, LogComparator, NoisePatterns};
use configparser::ini::Ini;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "llvm-bolt-wrapper.ini";
/// Section holding the settings.
pub const CONFIG_SECTION: &str = "config";
/// Section holding extra noise patterns, one regex per line.
pub const SKIP_MATCH_SECTION: &str = "skip_match";
/// Default timing log, relative to the working directory.
pub const DEFAULT_TIMING_FILE: &str = "timing.log";
/// Default per-run timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 9000;
/// Default timing harness.
pub const DEFAULT_TIME_TOOL: &str = "/usr/bin/time";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("llvm-bolt-wrapper.ini is not found in {}", dir.display())]
    NotFound { dir: PathBuf },

    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Malformed settings file: {0}")]
    Syntax(String),

    #[error("Missing [config] section")]
    MissingSection,

    #[error("Missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("Key '{0}' requires a value")]
    MissingValue(&'static str),

    #[error("Key '{key}' has invalid boolean value '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("Key '{key}' has invalid number '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("Skip pattern '{0}' requires a value")]
    PatternWithoutValue(String),

    #[error("Invalid skip pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Immutable settings shared by every stage of a comparison.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Reference llvm-bolt build.
    pub base_bolt: PathBuf,
    /// llvm-bolt build under evaluation.
    pub cmp_bolt: PathBuf,
    pub verbose: bool,
    /// Keep the workspace even when everything matches.
    pub keep_tmp: bool,
    /// Do not append the diff-minimizing flags.
    pub no_minimize: bool,
    /// Launch the comparison run only after the base run exits.
    pub run_sequentially: bool,
    /// Treat log differences as fatal.
    pub compare_output: bool,
    pub skip_binary_cmp: bool,
    pub strict_line_count: bool,
    /// Append-only timing log.
    pub timing_file: PathBuf,
    pub timeout: Duration,
    /// Harness invoked as `<time_tool> -f "%e %M" <bolt> <args>`.
    pub time_tool: PathBuf,
    /// External header dumper; headers are parsed in-process when unset.
    pub readelf: Option<PathBuf>,
    pub noise: NoisePatterns,
}

impl Settings {
    /// Settings with every optional key at its default.
    pub fn new(base_bolt: impl Into<PathBuf>, cmp_bolt: impl Into<PathBuf>) -> Self {
        Self {
            base_bolt: base_bolt.into(),
            cmp_bolt: cmp_bolt.into(),
            verbose: false,
            keep_tmp: false,
            no_minimize: false,
            run_sequentially: false,
            compare_output: false,
            skip_binary_cmp: false,
            strict_line_count: false,
            timing_file: PathBuf::from(DEFAULT_TIMING_FILE),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            time_tool: PathBuf::from(DEFAULT_TIME_TOOL),
            readelf: None,
            noise: NoisePatterns::builtin(),
        }
    }

    /// Load [`SETTINGS_FILE`] from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE);
        if !path.is_file() {
            return Err(SettingsError::NotFound {
                dir: dir.to_path_buf(),
            });
        }
        Self::load(&path)
    }

    /// Load settings from an explicit file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text)
    }

    /// Parse settings from INI text.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut ini = Ini::new();
        ini.set_multiline(true);
        ini.read(text.to_string()).map_err(SettingsError::Syntax)?;
        let config = Section::new(&ini, CONFIG_SECTION).ok_or(SettingsError::MissingSection)?;

        let mut settings = Self::new(
            config.required_path("base_bolt")?,
            config.required_path("cmp_bolt")?,
        );
        settings.verbose = config.flag("verbose")?;
        settings.keep_tmp = config.flag("keep_tmp")?;
        settings.no_minimize = config.flag("no_minimize")?;
        settings.run_sequentially = config.flag("run_sequentially")?;
        settings.compare_output = config.flag("compare_output")?;
        settings.skip_binary_cmp = config.flag("skip_binary_cmp")?;
        settings.strict_line_count = config.flag("strict_line_count")?;
        if let Some(path) = config.optional_path("timing_file")? {
            settings.timing_file = path;
        }
        if let Some(secs) = config.number("timeout")? {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = config.optional_path("time_tool")? {
            settings.time_tool = path;
        }
        settings.readelf = config.optional_path("readelf")?;

        if let Some(skip) = Section::new(&ini, SKIP_MATCH_SECTION) {
            for (_, pattern) in skip.patterns()? {
                settings
                    .noise
                    .extend([pattern])
                    .map_err(|source| SettingsError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })?;
            }
        }

        Ok(settings)
    }

    /// Resolve settings for a run started in `cwd`, honoring the
    /// `BOLT_WRAPPER_*` environment overrides.
    pub fn resolve(cwd: &Path) -> Result<Self, SettingsError> {
        let mut settings = match env::config_path() {
            Some(path) => Self::load(&path)?,
            None => Self::load_from_dir(cwd)?,
        };
        if let Some(secs) = env::timeout_secs() {
            settings.timeout = Duration::from_secs(secs);
        }
        if env::verbose() {
            settings.verbose = true;
        }
        Ok(settings)
    }

    /// Line comparator configured with these settings' noise and policy.
    pub fn log_comparator(&self) -> LogComparator {
        let policy = if self.strict_line_count {
            LineCountPolicy::Strict
        } else {
            LineCountPolicy::Lenient
        };
        LogComparator::new(self.noise.clone()).with_policy(policy)
    }

    pub fn header_dumper(&self) -> HeaderDumper {
        match &self.readelf {
            Some(tool) => HeaderDumper::External(tool.clone()),
            None => HeaderDumper::Builtin,
        }
    }
}

/// Entries of one section as parsed; `None` marks a bare key.
type Entries = HashMap<String, Option<String>>;

/// Typed reads from one parsed section.
struct Section<'a> {
    ini: &'a Ini,
    name: &'static str,
    entries: &'a Entries,
}

impl<'a> Section<'a> {
    fn new(ini: &'a Ini, name: &'static str) -> Option<Self> {
        ini.get_map_ref()
            .get(name)
            .map(|entries| Self { ini, name, entries })
    }

    /// Value for `key`; `Some(None)` for a bare key or an empty value.
    fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .get(key)
            .map(|value| value.as_deref().filter(|value| !value.is_empty()))
    }

    fn required_path(&self, key: &'static str) -> Result<PathBuf, SettingsError> {
        match self.get(key) {
            None => Err(SettingsError::MissingKey(key)),
            Some(None) => Err(SettingsError::MissingValue(key)),
            Some(Some(value)) => Ok(PathBuf::from(value)),
        }
    }

    fn optional_path(&self, key: &'static str) -> Result<Option<PathBuf>, SettingsError> {
        match self.get(key) {
            None => Ok(None),
            Some(None) => Err(SettingsError::MissingValue(key)),
            Some(Some(value)) => Ok(Some(PathBuf::from(value))),
        }
    }

    /// Absent keys are false; bare keys are true.
    fn flag(&self, key: &'static str) -> Result<bool, SettingsError> {
        match self.get(key) {
            None => Ok(false),
            Some(None) => Ok(true),
            Some(Some(value)) => match self.ini.getboolcoerce(self.name, key) {
                Ok(Some(flag)) => Ok(flag),
                _ => Err(SettingsError::InvalidBool {
                    key,
                    value: value.to_string(),
                }),
            },
        }
    }

    fn number(&self, key: &'static str) -> Result<Option<u64>, SettingsError> {
        match self.get(key) {
            None => Ok(None),
            Some(None) => Err(SettingsError::MissingValue(key)),
            Some(Some(value)) => match self.ini.getuint(self.name, key) {
                Ok(Some(number)) => Ok(Some(number)),
                _ => Err(SettingsError::InvalidNumber {
                    key,
                    value: value.to_string(),
                }),
            },
        }
    }

    /// `name = pattern` entries, ordered by name.
    fn patterns(&self) -> Result<Vec<(&'a str, &'a str)>, SettingsError> {
        let mut patterns = self
            .entries
            .iter()
            .map(|(name, pattern)| match pattern.as_deref() {
                Some(pattern) if !pattern.is_empty() => Ok((name.as_str(), pattern)),
                _ => Err(SettingsError::PatternWithoutValue(name.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        patterns.sort_unstable();
        Ok(patterns)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
