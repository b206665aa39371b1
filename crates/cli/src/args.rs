// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Argument translation.
//!
//! Output arguments name files llvm-bolt writes. The base run keeps them as
//! given; the comparison run gets the same base names inside its workspace so
//! the two runs never write to the same file. Arguments are kept as OS
//! strings throughout; llvm-bolt paths need not be valid UTF-8.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// A flag whose value is a path the tool writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFlag {
    /// Flag name without dashes.
    pub name: &'static str,
    pub description: &'static str,
}

/// Output flags understood by llvm-bolt and perf2bolt, in recognition order.
pub const BOLT_OUTPUT_FLAGS: &[OutputFlag] = &[
    OutputFlag {
        name: "o",
        description: "BOLT output binary",
    },
    OutputFlag {
        name: "w",
        description: "BOLT recorded profile",
    },
];

/// Output arguments found in an invocation, ordered by flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputArgs {
    entries: Vec<(OutputFlag, PathBuf)>,
}

impl OutputArgs {
    /// Path given for the flag named `name`.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(flag, _)| flag.name == name)
            .map(|(_, path)| path.as_path())
    }

    /// The `-o` path, if any.
    pub fn output_binary(&self) -> Option<&Path> {
        self.get("o")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutputFlag, &Path)> {
        self.entries.iter().map(|(flag, path)| (flag, path.as_path()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, flag: OutputFlag, path: PathBuf) {
        match self.entries.iter_mut().find(|(f, _)| f.name == flag.name) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((flag, path)),
        }
    }

    fn sorted(mut self, flags: &[OutputFlag]) -> Self {
        self.entries.sort_by_key(|(flag, _)| {
            flags
                .iter()
                .position(|f| f.name == flag.name)
                .unwrap_or(usize::MAX)
        });
        self
    }
}

/// Raw arguments split into what both runs share and what each run writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitArgs {
    pub passthrough: Vec<OsString>,
    pub outputs: OutputArgs,
}

impl SplitArgs {
    /// Full argument list for one run: pass-through tokens then `outputs`.
    pub fn with_outputs(&self, outputs: &OutputArgs) -> Vec<OsString> {
        let mut args = self.passthrough.clone();
        args.extend(reflatten(outputs));
        args
    }
}

/// Strip dashes and split an inline `=value`.
fn match_flag<'a>(
    token: &'a OsStr,
    flags: &[OutputFlag],
) -> Option<(OutputFlag, Option<&'a OsStr>)> {
    let bytes = token.as_bytes();
    let body = bytes
        .strip_prefix(b"--")
        .or_else(|| bytes.strip_prefix(b"-"))?;
    let (name, inline) = match body.iter().position(|&b| b == b'=') {
        Some(pos) => (&body[..pos], Some(OsStr::from_bytes(&body[pos + 1..]))),
        None => (body, None),
    };
    flags
        .iter()
        .find(|flag| flag.name.as_bytes() == name)
        .map(|flag| (*flag, inline))
}

/// Separate recognized output flags from everything else.
///
/// Accepts `-o value`, `-o=value`, `--o value` and `--o=value`. The last
/// occurrence of a flag wins. A flag without a value is passed through.
pub fn partition<S: AsRef<OsStr>>(raw: &[S], flags: &[OutputFlag]) -> SplitArgs {
    let mut split = SplitArgs::default();
    let mut tokens = raw.iter().map(AsRef::<OsStr>::as_ref).peekable();

    while let Some(token) = tokens.next() {
        match match_flag(token, flags) {
            Some((flag, Some(value))) if !value.is_empty() => {
                split.outputs.insert(flag, PathBuf::from(value));
            }
            Some((flag, None)) => match tokens.next_if(|next| !next.is_empty()) {
                Some(value) => split.outputs.insert(flag, PathBuf::from(value)),
                None => split.passthrough.push(token.to_os_string()),
            },
            _ => split.passthrough.push(token.to_os_string()),
        }
    }

    split.outputs = split.outputs.sorted(flags);
    split
}

/// Point every output path into `dir`, keeping its base name.
pub fn relocate(outputs: &OutputArgs, dir: &Path) -> OutputArgs {
    let entries = outputs
        .entries
        .iter()
        .map(|(flag, path)| {
            let file_name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(flag.name));
            (*flag, dir.join(file_name))
        })
        .collect();
    OutputArgs { entries }
}

/// Flatten back into `-flag value` tokens.
pub fn reflatten(outputs: &OutputArgs) -> Vec<OsString> {
    outputs
        .iter()
        .flat_map(|(flag, path)| {
            [
                OsString::from(format!("-{}", flag.name)),
                path.as_os_str().to_os_string(),
            ]
        })
        .collect()
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
