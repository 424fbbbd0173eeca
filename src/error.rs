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

//! Error types shared by every stage of dump generation and recovery.

/// Errors raised while generating a dump or recovering a palette.
///
/// Every variant is fatal for the operation that raised it. Statistically
/// wrong or unattributed palette slots are not errors; see
/// [`PaletteSlot::Unknown`](crate::PaletteSlot::Unknown).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value was rejected before any external call.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested colors cannot be tiled into the geometry.
    #[error("picture size too small: {width}x{height} cannot hold {colors} colors")]
    PictureTooSmall {
        width: usize,
        height: usize,
        colors: usize,
    },

    /// The converter process could not be started or talked to.
    #[error("{operation}: failed to run converter: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The converter exited with a non-zero status.
    #[error("{operation} failed (exit code {code:?}): {stderr}")]
    ConverterFailed {
        operation: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// A fixed-offset header field did not hold the expected value.
    #[error("unexpected {field} at offset {offset}: expected {expected:#04x}, found {found:#04x}")]
    HeaderMismatch {
        field: &'static str,
        offset: usize,
        expected: u8,
        found: u8,
    },

    /// A buffer ended before a structure it must contain.
    #[error("{what}: need {needed} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        needed: usize,
        actual: usize,
    },

    /// A raw RGB buffer does not match the identified geometry.
    #[error("raw buffer length mismatch: expected {expected} bytes for {width}x{height}, got {actual}")]
    BufferLength {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// `identify` printed something other than `<width> <height>`.
    #[error("cannot parse identify output {0:?}")]
    MalformedIdentify(String),

    /// A raw (PPM) image header could not be parsed.
    #[error("malformed raw image: {0}")]
    MalformedRaw(String),

    /// The converter does not handle this format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("PNG decode error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
