// Copyright 2025 Dustin McAfee
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GIF header fields the dump relies on, and the patch that empties the
//! global color table.
//!
//! # Header Layout
//!
//! ```text
//! offset  size  field
//!  0      6     signature "GIF87a" / "GIF89a"
//!  6      2     logical screen width  (LE)
//!  8      2     logical screen height (LE)
//! 10      1     packed flags
//! 11      1     background color index
//! 12      1     pixel aspect ratio
//! 13      3*2^(size+1)  global color table (if flag bit 7 set)
//! ```
//!
//! Packed flags: `[7] global table present | [6:4] color resolution |
//! [3] sorted | [2:0] table size (2^(n+1) entries)`.
//!
//! # Patch
//!
//! The converter writes a global table of exactly `2^log` grayscale entries,
//! so its flags byte must read `0xF0 | (log - 1)`. The patch clears the
//! table-present bit and replaces the table bytes with a comment extension
//! carrying 32 filler letters. Decoders that ignore the cleared bit and
//! still allocate a `2^log` table get it uninitialized, and the image data
//! indexes straight into that memory.

use bytes::{BufMut, BytesMut};

use crate::{Error, Result};

/// Length of the signature plus logical screen descriptor.
pub const HEADER_LEN: usize = 13;
/// Offset of the packed flags byte.
pub const FLAGS_OFFSET: usize = 10;

/// Global color table present.
pub const FLAG_GLOBAL_TABLE: u8 = 0x80;
/// Color resolution bits, all set for 8 bits per primary.
pub const FLAG_COLOR_RESOLUTION: u8 = 0x70;
/// Table sorted by importance.
pub const FLAG_SORTED: u8 = 0x08;
/// Table size exponent minus one.
pub const FLAG_TABLE_SIZE: u8 = 0x07;

const EXTENSION_INTRODUCER: u8 = 0x21;
const COMMENT_LABEL: u8 = 0xFE;
const BLOCK_TERMINATOR: u8 = 0x00;

/// Letters written into the comment extension.
pub const FILLER_LEN: usize = 32;

/// Signature plus logical screen descriptor, parsed from the first 13 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenDescriptor {
    pub version: [u8; 3],
    pub width: u16,
    pub height: u16,
    pub flags: u8,
    pub background: u8,
    pub aspect: u8,
}

impl ScreenDescriptor {
    /// # Errors
    ///
    /// Returns [`Error::Truncated`] for buffers shorter than the header and
    /// [`Error::HeaderMismatch`] for a bad signature.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated {
                what: "GIF header",
                needed: HEADER_LEN,
                actual: data.len(),
            });
        }
        for (offset, &expected) in b"GIF".iter().enumerate() {
            if data[offset] != expected {
                return Err(Error::HeaderMismatch {
                    field: "signature",
                    offset,
                    expected,
                    found: data[offset],
                });
            }
        }
        let version = [data[3], data[4], data[5]];
        if &version != b"87a" && &version != b"89a" {
            return Err(Error::HeaderMismatch {
                field: "version",
                offset: 4,
                expected: b'9',
                found: data[4],
            });
        }

        Ok(Self {
            version,
            width: u16::from_le_bytes([data[6], data[7]]),
            height: u16::from_le_bytes([data[8], data[9]]),
            flags: data[FLAGS_OFFSET],
            background: data[11],
            aspect: data[12],
        })
    }

    #[must_use]
    pub fn has_global_table(&self) -> bool {
        self.flags & FLAG_GLOBAL_TABLE != 0
    }

    /// Entries in the global table as declared by the size bits.
    #[must_use]
    pub fn global_table_entries(&self) -> usize {
        2 << (self.flags & FLAG_TABLE_SIZE)
    }
}

/// Flags byte the converter must emit for a `2^palette_size_log` table:
/// table present, full color resolution, unsorted.
///
/// # Panics
///
/// Panics if `palette_size_log` is not in 1..=8.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Checked to be <= 8
pub fn expected_flags(palette_size_log: u32) -> u8 {
    assert!(
        (1..=8).contains(&palette_size_log),
        "palette size log {palette_size_log} out of range"
    );
    FLAG_GLOBAL_TABLE | FLAG_COLOR_RESOLUTION | (palette_size_log - 1) as u8
}

/// Comment extension block: introducer, label, a 32-byte sub-block and the
/// terminator.
#[allow(clippy::cast_possible_truncation)] // FILLER_LEN fits a sub-block length
#[must_use]
pub fn comment_extension(filler: &[u8; FILLER_LEN]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(FILLER_LEN + 4);
    buf.put_u8(EXTENSION_INTRODUCER);
    buf.put_u8(COMMENT_LABEL);
    buf.put_u8(FILLER_LEN as u8);
    buf.put_slice(filler);
    buf.put_u8(BLOCK_TERMINATOR);
    buf.to_vec()
}

/// Validates the converter's header, clears the table-present bit and
/// splices the comment extension over the global color table.
///
/// The declared table size bits are left untouched.
///
/// # Errors
///
/// Returns [`Error::HeaderMismatch`] if the flags byte is not exactly
/// [`expected_flags`], and [`Error::Truncated`] if the buffer is shorter
/// than header plus table. The buffer is not modified on error.
pub fn patch_global_table(
    gif: &mut Vec<u8>,
    palette_size_log: u32,
    filler: &[u8; FILLER_LEN],
) -> Result<()> {
    let descriptor = ScreenDescriptor::parse(gif)?;
    let expected = expected_flags(palette_size_log);
    if descriptor.flags != expected {
        return Err(Error::HeaderMismatch {
            field: "packed flags",
            offset: FLAGS_OFFSET,
            expected,
            found: descriptor.flags,
        });
    }

    let table_len = 3 * descriptor.global_table_entries();
    let table_end = HEADER_LEN + table_len;
    if gif.len() < table_end {
        return Err(Error::Truncated {
            what: "GIF global color table",
            needed: table_end,
            actual: gif.len(),
        });
    }

    gif[FLAGS_OFFSET] ^= FLAG_GLOBAL_TABLE;
    gif.splice(HEADER_LEN..table_end, comment_extension(filler));

    log::debug!(
        "patched GIF header: flags {:#04x} -> {:#04x}, replaced {} table bytes",
        expected,
        gif[FLAGS_OFFSET],
        table_len
    );
    Ok(())
}
