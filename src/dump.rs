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

//! Dump GIF generation.
//!
//! # Process
//!
//! 1. Synthesize the block picture for the requested geometry.
//! 2. Encode it as PPM with a grayscale placeholder palette of `2^log`
//!    entries, doubling the frame when a fake animation is requested.
//! 3. Have the converter write a GIF, which carries exactly that palette as
//!    its global color table.
//! 4. Validate the flags byte, clear the table-present bit and splice a
//!    comment with random filler over the table (see [`crate::gif`]).
//!
//! A vulnerable converter that later reads the dump renders every block
//! with whatever stale bytes sit in its uninitialized table.

use rand::Rng;

use crate::config::{ColorCount, Geometry};
use crate::converter::{Converter, Transcode, FORMAT_GIF, FORMAT_PPM};
use crate::gif::{self, FILLER_LEN};
use crate::palette::grayscale_palette;
use crate::picture::Picture;
use crate::ppm::encode_ppm;
use crate::Result;

const FILLER_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Parameters of one dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpRequest {
    pub geometry: Geometry,
    pub colors: ColorCount,
    /// Ask for a two-frame GIF with identical frames.
    pub animate: bool,
}

impl DumpRequest {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            colors: ColorCount::MAX,
            animate: false,
        }
    }
}

/// Random ASCII letters keeping otherwise identical dumps distinct, so
/// caches in front of a converter do not serve a previous result.
pub fn cache_filler<R: Rng + ?Sized>(rng: &mut R) -> [u8; FILLER_LEN] {
    std::array::from_fn(|_| FILLER_ALPHABET[rng.gen_range(0..FILLER_ALPHABET.len())])
}

/// Builds a dump GIF through `converter`.
///
/// # Errors
///
/// Returns [`Error::PictureTooSmall`](crate::Error::PictureTooSmall) for
/// infeasible geometry, converter failures as-is, and
/// [`Error::HeaderMismatch`](crate::Error::HeaderMismatch) /
/// [`Error::Truncated`](crate::Error::Truncated) when the converter's GIF does
/// not have the expected header shape.
pub fn generate_dump<C, R>(converter: &C, request: &DumpRequest, rng: &mut R) -> Result<Vec<u8>>
where
    C: Converter + ?Sized,
    R: Rng + ?Sized,
{
    let Geometry { width, height } = request.geometry;
    let palette_size_log = request.colors.palette_size_log();
    let palette = grayscale_palette(request.colors.table_entries());

    let picture = Picture::synthesize(width, height, request.colors)?;
    let mut ppm = encode_ppm(&palette, &picture);
    if request.animate {
        ppm.extend_from_within(..);
    }

    let mut dump = converter.transcode(
        &ppm,
        &Transcode {
            source: Some(FORMAT_PPM),
            target: FORMAT_GIF,
            frame: None,
            quality: None,
        },
    )?;

    gif::patch_global_table(&mut dump, palette_size_log, &cache_filler(rng))?;

    log::info!(
        "generated {} dump: {} colors, {}-entry table, {} bytes{}",
        request.geometry,
        request.colors,
        palette.len(),
        dump.len(),
        if request.animate { ", animated" } else { "" }
    );
    Ok(dump)
}
