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

//! Validated configuration values.
//!
//! Everything a user can type is parsed into one of these types before any
//! converter process is started, so malformed input never reaches a command
//! line.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Largest number of colors a GIF color table can hold.
pub const MAX_COLORS: usize = 256;

/// Picture geometry in pixels, written `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    /// Creates a geometry, rejecting zero-sized dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(format!(
                "geometry must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl FromStr for Geometry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wrong = || Error::InvalidConfig(format!("wrong geometry format: {s}"));
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(wrong)?;
        let width = w.trim().parse().map_err(|_| wrong())?;
        let height = h.trim().parse().map_err(|_| wrong())?;
        Self::new(width, height)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Number of palette entries to dump or recover, 1..=256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorCount(u16);

impl ColorCount {
    /// The full 256-entry table.
    pub const MAX: ColorCount = ColorCount(MAX_COLORS as u16);

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] outside 1..=256.
    #[allow(clippy::cast_possible_truncation)] // Range checked before the cast
    pub fn new(count: usize) -> Result<Self> {
        if !(1..=MAX_COLORS).contains(&count) {
            return Err(Error::InvalidConfig(format!(
                "color count must be between 1 and {MAX_COLORS}, got {count}"
            )));
        }
        Ok(Self(count as u16))
    }

    #[must_use]
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// Smallest `log >= 1` such that `2^log >= count`.
    ///
    /// GIF tables always hold a power of two entries and never fewer than
    /// two, so a single color still needs a 2-entry table.
    #[must_use]
    pub fn palette_size_log(self) -> u32 {
        let mut log = 1;
        while (1usize << log) < self.get() {
            log += 1;
        }
        log
    }

    /// Number of entries in the table the converter will emit.
    #[must_use]
    pub fn table_entries(self) -> usize {
        1 << self.palette_size_log()
    }
}

impl Default for ColorCount {
    fn default() -> Self {
        Self::MAX
    }
}

impl FromStr for ColorCount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let count: usize = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("color count is not a number: {s}")))?;
        Self::new(count)
    }
}

impl fmt::Display for ColorCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converter format name such as `png`, `jpeg` or `gif`.
///
/// Only ASCII letters and digits are accepted since the name is spliced
/// into a converter argument (`<format>:-`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format(String);

impl Format {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(format!(
                "format must be alphanumeric, got {s:?}"
            )));
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
