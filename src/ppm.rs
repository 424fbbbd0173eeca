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

//! Raw image buffers (binary PPM, `P6`).
//!
//! # Wire Format
//!
//! ```text
//! P6\n<width> <height>\n255\n<height * width * 3 bytes of RGB>
//! ```
//!
//! Every converter reads this without hints, which makes it the hand-off
//! format between synthesized pictures and the converter. Several frames may
//! be concatenated back to back to form an animation.

use bytes::{BufMut, BytesMut};

use crate::picture::Picture;
use crate::{Error, Result, Rgb};

const MAGIC: &[u8; 2] = b"P6";
const MAX_VALUE: usize = 255;

/// Encodes `picture` as a PPM, mapping each index through `palette`.
///
/// # Panics
///
/// Panics if the picture references an index past the end of `palette`.
/// Callers always pass a palette covering the color count the picture was
/// synthesized with.
#[must_use]
pub fn encode_ppm(palette: &[Rgb], picture: &Picture) -> Vec<u8> {
    let (width, height) = (picture.width(), picture.height());
    let header = format!("P6\n{width} {height}\n{MAX_VALUE}\n");
    let mut buf = BytesMut::with_capacity(header.len() + width * height * 3);
    buf.put_slice(header.as_bytes());

    for &index in picture.cells() {
        let rgb = palette.get(usize::from(index)).unwrap_or_else(|| {
            panic!(
                "picture index {index} outside palette of {} entries",
                palette.len()
            )
        });
        buf.put_slice(rgb);
    }

    buf.to_vec()
}

/// One decoded PPM frame with tightly packed RGB data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
}

/// Decodes every frame of a (possibly multi-frame) `P6` buffer.
///
/// Header tokens may be separated by any whitespace and `#` comments. Only a
/// max value of 255 is accepted.
///
/// # Errors
///
/// Returns [`Error::MalformedRaw`] for bad headers and [`Error::Truncated`]
/// when pixel data is cut short.
pub fn decode_frames(data: &[u8]) -> Result<Vec<RawFrame>> {
    let mut frames = Vec::new();
    let mut pos = 0;

    loop {
        pos = skip_whitespace(data, pos);
        if pos >= data.len() {
            break;
        }
        let (frame, next) = decode_frame(data, pos)?;
        frames.push(frame);
        pos = next;
    }

    if frames.is_empty() {
        return Err(Error::MalformedRaw("no frames".to_string()));
    }
    Ok(frames)
}

fn decode_frame(data: &[u8], start: usize) -> Result<(RawFrame, usize)> {
    if !data[start..].starts_with(MAGIC) {
        return Err(Error::MalformedRaw(format!(
            "missing P6 magic at offset {start}"
        )));
    }
    let mut pos = start + MAGIC.len();

    let mut fields = [0usize; 3];
    for field in &mut fields {
        let (value, next) = read_number(data, pos)?;
        *field = value;
        pos = next;
    }
    let [width, height, max_value] = fields;
    if max_value != MAX_VALUE {
        return Err(Error::MalformedRaw(format!(
            "unsupported max value {max_value}"
        )));
    }

    // Exactly one whitespace byte separates the header from the pixels
    if !data.get(pos).is_some_and(u8::is_ascii_whitespace) {
        return Err(Error::MalformedRaw("header not terminated".to_string()));
    }
    pos += 1;

    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| Error::MalformedRaw(format!("dimensions {width}x{height} overflow")))?;
    let end = pos
        .checked_add(len)
        .ok_or_else(|| Error::MalformedRaw(format!("frame of {len} bytes overflows")))?;
    if data.len() < end {
        return Err(Error::Truncated {
            what: "PPM pixel data",
            needed: len,
            actual: data.len() - pos,
        });
    }

    let frame = RawFrame {
        width,
        height,
        rgb: data[pos..end].to_vec(),
    };
    Ok((frame, end))
}

fn skip_whitespace(data: &[u8], mut pos: usize) -> usize {
    while pos < data.len() {
        match data[pos] {
            b'#' => {
                while pos < data.len() && data[pos] != b'\n' {
                    pos += 1;
                }
            }
            b if b.is_ascii_whitespace() => pos += 1,
            _ => break,
        }
    }
    pos
}

fn read_number(data: &[u8], pos: usize) -> Result<(usize, usize)> {
    let start = skip_whitespace(data, pos);
    let digits = data[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(Error::MalformedRaw(format!(
            "expected a number at offset {start}"
        )));
    }
    let end = start + digits;
    let value = std::str::from_utf8(&data[start..end])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::MalformedRaw(format!("number too large at offset {start}")))?;
    Ok((value, end))
}
