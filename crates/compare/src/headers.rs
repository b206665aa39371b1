// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ELF structural headers: dumping for comparison, and mapping a file offset
//! back to the part of the file that contains it.

use crate::error::CompareError;
use object::elf;
use object::read::elf::{FileHeader, ProgramHeader as _, SectionHeader as _};
use object::{Endianness, FileKind};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// How structural headers are rendered to text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HeaderDumper {
    /// Parse the file in-process.
    #[default]
    Builtin,
    /// Run an external `readelf`-compatible tool with `-We`.
    External(PathBuf),
}

impl HeaderDumper {
    /// Render the file, program and section headers of `path`, one field
    /// group per line.
    pub fn dump(&self, path: &Path) -> Result<String, CompareError> {
        match self {
            Self::Builtin => {
                let data = std::fs::read(path).map_err(|e| CompareError::io(path, e))?;
                dump_headers(path, &data)
            }
            Self::External(tool) => run_external(tool, path),
        }
    }
}

fn run_external(tool: &Path, binary: &Path) -> Result<String, CompareError> {
    let output = Command::new(tool)
        .arg("-We")
        .arg(binary)
        .output()
        .map_err(|e| CompareError::Dumper {
            tool: tool.to_path_buf(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CompareError::Dumper {
            tool: tool.to_path_buf(),
            message: format!("exited with {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn dump_headers(path: &Path, data: &[u8]) -> Result<String, CompareError> {
    let kind = FileKind::parse(data).map_err(|e| CompareError::parse(path, e))?;
    let dumped = match kind {
        FileKind::Elf32 => dump_elf::<elf::FileHeader32<Endianness>>(data),
        FileKind::Elf64 => dump_elf::<elf::FileHeader64<Endianness>>(data),
        _ => {
            return Err(CompareError::NotElf {
                path: path.to_path_buf(),
            })
        }
    };
    dumped.map_err(|e| CompareError::parse(path, e))
}

fn word<W: Into<u64>>(value: W) -> u64 {
    value.into()
}

fn dump_elf<Elf: FileHeader<Endian = Endianness>>(data: &[u8]) -> object::Result<String> {
    let header = Elf::parse(data)?;
    let endian = header.endian()?;
    let mut lines = vec![
        "ELF Header:".to_string(),
        format!("  Type: {:#x}", header.e_type(endian)),
        format!("  Machine: {:#x}", header.e_machine(endian)),
        format!("  Version: {:#x}", header.e_version(endian)),
        format!("  Entry point address: {:#x}", word(header.e_entry(endian))),
        format!("  Start of program headers: {}", word(header.e_phoff(endian))),
        format!("  Start of section headers: {}", word(header.e_shoff(endian))),
        format!("  Flags: {:#x}", header.e_flags(endian)),
        format!("  Size of this header: {}", header.e_ehsize(endian)),
        format!("  Size of program headers: {}", header.e_phentsize(endian)),
        format!("  Number of program headers: {}", header.e_phnum(endian)),
        format!("  Size of section headers: {}", header.e_shentsize(endian)),
        format!("  Number of section headers: {}", header.e_shnum(endian)),
        format!("  Section header string table index: {}", header.e_shstrndx(endian)),
    ];

    lines.push("Program Headers:".to_string());
    for segment in header.program_headers(endian, data)? {
        lines.push(format!(
            "  type={:#x} flags={:#x} offset={:#x} vaddr={:#x} paddr={:#x} filesz={:#x} memsz={:#x} align={:#x}",
            segment.p_type(endian),
            segment.p_flags(endian),
            word(segment.p_offset(endian)),
            word(segment.p_vaddr(endian)),
            word(segment.p_paddr(endian)),
            word(segment.p_filesz(endian)),
            word(segment.p_memsz(endian)),
            word(segment.p_align(endian)),
        ));
    }

    lines.push("Section Headers:".to_string());
    let sections = header.sections(endian, data)?;
    for (index, section) in sections.iter().enumerate() {
        let name = sections.section_name(endian, section)?;
        lines.push(format!(
            "  [{index:2}] {} type={:#x} flags={:#x} addr={:#x} offset={:#x} size={:#x} link={} info={} align={:#x} entsize={:#x}",
            String::from_utf8_lossy(name),
            section.sh_type(endian),
            word(section.sh_flags(endian)),
            word(section.sh_addr(endian)),
            word(section.sh_offset(endian)),
            word(section.sh_size(endian)),
            section.sh_link(endian),
            section.sh_info(endian),
            word(section.sh_addralign(endian)),
            word(section.sh_entsize(endian)),
        ));
    }

    lines.push(String::new());
    Ok(lines.join("\n"))
}

/// The part of an ELF file that contains a given byte offset.
///
/// This is a hint for whoever investigates a mismatch; it does not try to
/// explain why the bytes differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OffsetLocation {
    FileHeader,
    ProgramHeaders,
    SectionHeaders,
    Section {
        index: usize,
        name: String,
        offset_in_section: u64,
    },
    /// Padding between sections or bytes no header describes.
    Unmapped,
}

impl fmt::Display for OffsetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileHeader => write!(f, "ELF header"),
            Self::ProgramHeaders => write!(f, "program header table"),
            Self::SectionHeaders => write!(f, "section header table"),
            Self::Section {
                index,
                name,
                offset_in_section,
            } => write!(f, "section [{index}] {name} at +{offset_in_section:#x}"),
            Self::Unmapped => write!(f, "no section"),
        }
    }
}

/// Find which header table or section contains `offset`.
pub fn locate_offset(data: &[u8], offset: u64) -> object::Result<OffsetLocation> {
    match FileKind::parse(data)? {
        FileKind::Elf32 => locate_elf::<elf::FileHeader32<Endianness>>(data, offset),
        FileKind::Elf64 => locate_elf::<elf::FileHeader64<Endianness>>(data, offset),
        _ => Ok(OffsetLocation::Unmapped),
    }
}

fn locate_elf<Elf: FileHeader<Endian = Endianness>>(
    data: &[u8],
    offset: u64,
) -> object::Result<OffsetLocation> {
    let header = Elf::parse(data)?;
    let endian = header.endian()?;

    if offset < u64::from(header.e_ehsize(endian)) {
        return Ok(OffsetLocation::FileHeader);
    }

    let in_table = |start: u64, count: u16, entsize: u16| {
        let len = u64::from(count) * u64::from(entsize);
        start != 0 && offset >= start && offset - start < len
    };
    if in_table(
        word(header.e_phoff(endian)),
        header.e_phnum(endian),
        header.e_phentsize(endian),
    ) {
        return Ok(OffsetLocation::ProgramHeaders);
    }
    if in_table(
        word(header.e_shoff(endian)),
        header.e_shnum(endian),
        header.e_shentsize(endian),
    ) {
        return Ok(OffsetLocation::SectionHeaders);
    }

    let sections = header.sections(endian, data)?;
    for (index, section) in sections.iter().enumerate() {
        if section.sh_type(endian) == elf::SHT_NOBITS {
            continue;
        }
        let start = word(section.sh_offset(endian));
        let size = word(section.sh_size(endian));
        if offset >= start && offset - start < size {
            let name = sections.section_name(endian, section)?;
            return Ok(OffsetLocation::Section {
                index,
                name: String::from_utf8_lossy(name).into_owned(),
                offset_in_section: offset - start,
            });
        }
    }

    Ok(OffsetLocation::Unmapped)
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod tests;
