// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output binary comparison.
//!
//! Bytes are compared first. Only when they differ do we look at the file
//! format: non-ELF outputs are reported as-is, ELF outputs get their
//! structural headers compared, and if those agree the first differing byte
//! offset is reported together with the section it falls into.

use crate::error::CompareError;
use crate::headers::{locate_offset, HeaderDumper, OffsetLocation};
use crate::log::{LineMismatch, LogComparator};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Leading bytes of every ELF file.
pub const ELF_MAGIC: [u8; 4] = *b"\x7fELF";

const CHUNK: usize = 64 * 1024;

/// Why two output binaries are not equivalent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinaryMismatch {
    /// At least one output is not an ELF file, so only bytes can be compared.
    NotElf { offset: u64 },
    /// A structural header line differs.
    Headers {
        mismatch: LineMismatch,
        main_dump: String,
        cmp_dump: String,
    },
    /// Headers agree but the bytes do not.
    Bytes {
        offset: u64,
        location: OffsetLocation,
    },
}

/// Offset of the first byte that differs between two files.
///
/// When one file is a prefix of the other, the length of the shorter file is
/// reported.
pub fn first_difference(main: &Path, cmp: &Path) -> Result<Option<u64>, CompareError> {
    let mut lhs = File::open(main).map_err(|e| CompareError::io(main, e))?;
    let mut rhs = File::open(cmp).map_err(|e| CompareError::io(cmp, e))?;
    let mut lhs_buf = vec![0u8; CHUNK];
    let mut rhs_buf = vec![0u8; CHUNK];
    let mut consumed = 0u64;

    loop {
        let lhs_len = read_chunk(&mut lhs, &mut lhs_buf).map_err(|e| CompareError::io(main, e))?;
        let rhs_len = read_chunk(&mut rhs, &mut rhs_buf).map_err(|e| CompareError::io(cmp, e))?;
        let common = lhs_len.min(rhs_len);

        if let Some(pos) = lhs_buf[..common]
            .iter()
            .zip(&rhs_buf[..common])
            .position(|(a, b)| a != b)
        {
            return Ok(Some(consumed + pos as u64));
        }
        if lhs_len != rhs_len {
            return Ok(Some(consumed + common as u64));
        }
        if lhs_len == 0 {
            return Ok(None);
        }
        consumed += common as u64;
    }
}

/// Fill `buf` as far as the reader allows. Short only at end of file.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Whether the file starts with [`ELF_MAGIC`].
pub fn has_elf_magic(path: &Path) -> Result<bool, CompareError> {
    let mut file = File::open(path).map_err(|e| CompareError::io(path, e))?;
    let mut magic = [0u8; 4];
    let len = read_chunk(&mut file, &mut magic).map_err(|e| CompareError::io(path, e))?;
    Ok(len == magic.len() && magic == ELF_MAGIC)
}

/// Compare two output binaries, returning `None` when they are byte-identical.
pub fn compare_outputs(
    main: &Path,
    cmp: &Path,
    dumper: &HeaderDumper,
    comparator: &LogComparator,
) -> Result<Option<BinaryMismatch>, CompareError> {
    let Some(offset) = first_difference(main, cmp)? else {
        return Ok(None);
    };

    if !has_elf_magic(main)? || !has_elf_magic(cmp)? {
        return Ok(Some(BinaryMismatch::NotElf { offset }));
    }

    let (main_dump, main_parsed) = dump_or_error(dumper, main)?;
    let (cmp_dump, cmp_parsed) = dump_or_error(dumper, cmp)?;
    let mismatch = match comparator.compare(&main_dump, &cmp_dump, 0) {
        Some(mismatch) => Some(mismatch),
        None if !(main_parsed && cmp_parsed) => Some(LineMismatch::new(
            main_dump.lines().next().unwrap_or_default(),
            cmp_dump.lines().next().unwrap_or_default(),
        )),
        None => None,
    };
    if let Some(mismatch) = mismatch {
        return Ok(Some(BinaryMismatch::Headers {
            mismatch,
            main_dump,
            cmp_dump,
        }));
    }

    let data = std::fs::read(main).map_err(|e| CompareError::io(main, e))?;
    let location = locate_offset(&data, offset).map_err(|e| CompareError::parse(main, e))?;
    Ok(Some(BinaryMismatch::Bytes { offset, location }))
}

/// Header dump of `path`, and whether it parsed. A file that carries the
/// ELF magic but cannot be parsed dumps as its parse error.
fn dump_or_error(dumper: &HeaderDumper, path: &Path) -> Result<(String, bool), CompareError> {
    match dumper.dump(path) {
        Ok(dump) => Ok((dump, true)),
        Err(error @ CompareError::Parse { .. }) => Ok((format!("{error}\n"), false)),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
#[path = "binary_tests.rs"]
mod tests;
