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

//! Palette recovery by per-index majority vote.
//!
//! The decoded picture is matched against the layout [`Picture::synthesize`]
//! produces for the same geometry. Every pixel votes for the color of the
//! index it was drawn with, and each index elects its most frequent color.
//! Resampling and lossy compression disturb block edges and add noise, but
//! each index owns whole blocks of identical pixels, so the mode survives.
//!
//! The grid must have the geometry the dump was generated with. Nothing
//! here can detect a mismatch; the result is simply wrong.

use std::collections::HashMap;

use crate::config::ColorCount;
use crate::loader::PixelGrid;
use crate::palette::{PaletteSlot, RecoveredPalette};
use crate::picture::Picture;
use crate::{Result, Rgb};

/// Observed colors per palette index.
#[derive(Debug, Clone, Default)]
pub struct AttributionMultiset {
    buckets: Vec<Vec<Rgb>>,
}

impl AttributionMultiset {
    /// Empty buckets for `colors` indices.
    #[must_use]
    pub fn new(colors: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); colors],
        }
    }

    /// Records one observation of `rgb` for `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the color count.
    pub fn attribute(&mut self, index: u8, rgb: Rgb) {
        self.buckets[usize::from(index)].push(rgb);
    }

    #[must_use]
    pub fn samples(&self, index: usize) -> &[Rgb] {
        &self.buckets[index]
    }

    /// Elects the most frequent color of every bucket.
    #[must_use]
    pub fn elect(&self) -> RecoveredPalette {
        RecoveredPalette::new(
            self.buckets
                .iter()
                .map(|samples| mode(samples).map_or(PaletteSlot::Unknown, PaletteSlot::Known))
                .collect(),
        )
    }
}

/// Most frequent sample. Ties go to the sample seen first.
fn mode(samples: &[Rgb]) -> Option<Rgb> {
    // color -> (count, first position)
    let mut counts: HashMap<Rgb, (usize, usize)> = HashMap::new();
    for (position, &rgb) in samples.iter().enumerate() {
        counts.entry(rgb).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(rgb, _)| rgb)
}

/// Recovers `colors` palette entries from a decoded dump.
///
/// # Errors
///
/// Returns [`Error::PictureTooSmall`](crate::Error::PictureTooSmall) if the
/// grid cannot hold `colors` indices.
pub fn recover(grid: &PixelGrid, colors: ColorCount) -> Result<RecoveredPalette> {
    let picture = Picture::synthesize(grid.width(), grid.height(), colors)?;

    let mut multiset = AttributionMultiset::new(colors.get());
    for (&index, &rgb) in picture.cells().iter().zip(grid.pixels()) {
        multiset.attribute(index, rgb);
    }

    let palette = multiset.elect();
    let unknown = palette.unknown_count();
    if unknown > 0 {
        log::warn!("{unknown} of {colors} palette entries had no pixels");
    }
    log::info!(
        "recovered {} palette entries from {}x{} picture (block size {})",
        colors,
        grid.width(),
        grid.height(),
        picture.block_size()
    );
    Ok(palette)
}
