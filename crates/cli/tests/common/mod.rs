// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

//! Shared fixtures: fake llvm-bolt builds and a fake timing harness in a
//! scratch working directory.

use object::write::Object as ObjectWriter;
use object::{Architecture, BinaryFormat, Endianness, SectionKind};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for `/usr/bin/time -f "%e %M"`.
pub const FAKE_TIME: &str = "#!/bin/sh
shift 2
\"$@\"
status=$?
echo \"0.50 $$\" >&2
exit $status
";

/// Shell snippet writing `$CONTENT` to the `-o` path.
pub const WRITE_OUTPUT: &str = "
out=''
while [ $# -gt 0 ]; do
  if [ \"$1\" = -o ]; then out=\"$2\"; shift; fi
  shift
done
if [ -n \"$out\" ]; then printf '%s' \"$CONTENT\" > \"$out\"; fi
";

/// Shell snippet copying `$SOURCE` from the script's directory to the `-o` path.
pub const COPY_OUTPUT: &str = "
out=''
while [ $# -gt 0 ]; do
  if [ \"$1\" = -o ]; then out=\"$2\"; shift; fi
  shift
done
cp \"$(dirname \"$0\")/$SOURCE\" \"$out\"
";

pub fn wrapper_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_llvm-bolt-wrapper"))
}

/// Tool body that writes `content` to its `-o` argument.
pub fn writer(content: &str) -> String {
    format!("CONTENT='{content}'\n{WRITE_OUTPUT}")
}

/// Tool body that copies `source`, next to the tool, to its `-o` argument.
pub fn copier(source: &str) -> String {
    format!("SOURCE='{source}'\n{COPY_OUTPUT}")
}

/// Relocatable x86-64 ELF whose only user section is `.text` holding `code`.
pub fn elf_with_text(code: &[u8]) -> Vec<u8> {
    let mut obj = ObjectWriter::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let text = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    obj.append_section_data(text, code, 16);
    obj.write().unwrap()
}

pub struct Harness {
    pub dir: TempDir,
}

impl Harness {
    /// Working directory with two fake builds and a settings file.
    pub fn new(main_body: &str, cmp_body: &str, extra_config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let harness = Self { dir };
        let time = harness.script("time", FAKE_TIME);
        let base = harness.script("base-bolt", &format!("#!/bin/sh\n{main_body}\n"));
        let cmp = harness.script("cmp-bolt", &format!("#!/bin/sh\n{cmp_body}\n"));

        let config = format!(
            "[config]\nbase_bolt = {}\ncmp_bolt = {}\ntime_tool = {}\n{extra_config}\n",
            base.display(),
            cmp.display(),
            time.display()
        );
        std::fs::write(harness.path().join("llvm-bolt-wrapper.ini"), config).unwrap();
        harness
    }

    pub fn same(body: &str, extra_config: &str) -> Self {
        Self::new(body, body, extra_config)
    }

    /// Builds that write `main` and `cmp` as their `-o` output.
    pub fn outputs(main: &[u8], cmp: &[u8], extra_config: &str) -> Self {
        let harness = Self::new(&copier("main.out"), &copier("cmp.out"), extra_config);
        std::fs::write(harness.path().join("main.out"), main).unwrap();
        std::fs::write(harness.path().join("cmp.out"), cmp).unwrap();
        harness
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// The wrapper started in this directory, with overrides cleared.
    pub fn command(&self) -> Command {
        self.command_for(&wrapper_bin())
    }

    pub fn command_for(&self, program: &Path) -> Command {
        let mut command = Command::new(program);
        command
            .current_dir(self.path())
            .env_remove("BOLT_WRAPPER_CONFIG")
            .env_remove("BOLT_WRAPPER_TIMEOUT_SECS")
            .env_remove("BOLT_WRAPPER_VERBOSE");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    /// Install the wrapper under another name, as a symlink would.
    pub fn alias(&self, name: &str) -> PathBuf {
        let link = self.path().join(name);
        std::os::unix::fs::symlink(wrapper_bin(), &link).unwrap();
        link
    }

    pub fn timing_log(&self) -> String {
        std::fs::read_to_string(self.path().join("timing.log")).unwrap_or_default()
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Workspace path printed as the first stdout line of a failed run.
pub struct Retained(pub PathBuf);

impl Retained {
    pub fn from_output(output: &Output) -> Self {
        let stdout = stdout(output);
        let first = stdout.lines().next().unwrap_or_default();
        let path = PathBuf::from(first);
        assert!(path.is_dir(), "no workspace in stdout: {stdout}");
        Self(path)
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.0.join(name)).unwrap()
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.join(name).is_file()
    }
}

impl Drop for Retained {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
