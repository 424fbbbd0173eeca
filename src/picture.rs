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

//! Deterministic color-index pictures.
//!
//! A picture is tiled with square blocks, one palette index per block, in
//! row-major order modulo the color count. The block size is the largest
//! power of two that still leaves at least `colors` blocks, so every index
//! covers at least one block big enough to survive resampling and lossy
//! compression.
//!
//! # Layout
//!
//! ```text
//! per_row = width / s, per_column = height / s
//! block (r, c) -> (r * per_row + c) % colors
//! ```
//!
//! Columns past `per_row * s` repeat the last block column of their row and
//! rows past `per_column * s` repeat the last full row. Generation and
//! recovery both call [`Picture::synthesize`], so the layout must stay
//! bit-for-bit stable.

use crate::config::ColorCount;
use crate::{Error, Result};

/// Largest power-of-two block size leaving at least `colors` whole blocks.
///
/// # Errors
///
/// Returns [`Error::PictureTooSmall`] if even 1x1 blocks cannot hold every
/// color, i.e. `width * height < colors`.
pub fn block_size(width: usize, height: usize, colors: ColorCount) -> Result<usize> {
    let colors = colors.get();
    let blocks = |s: usize| (width / s).saturating_mul(height / s);

    let mut size = 1;
    while blocks(size) >= colors {
        size *= 2;
    }
    if size == 1 {
        return Err(Error::PictureTooSmall {
            width,
            height,
            colors,
        });
    }
    Ok(size / 2)
}

/// Grid of color indices, `height` rows of `width` cells, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    width: usize,
    height: usize,
    block_size: usize,
    cells: Vec<u8>,
}

impl Picture {
    /// Lays out the block picture for the given geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PictureTooSmall`] when the geometry has fewer pixels
    /// than colors, [`Error::InvalidConfig`] when its area overflows.
    #[allow(clippy::cast_possible_truncation)] // Indices are < colors <= 256
    pub fn synthesize(width: usize, height: usize, colors: ColorCount) -> Result<Self> {
        let size = block_size(width, height, colors)?;
        let area = width.checked_mul(height).ok_or_else(|| {
            Error::InvalidConfig(format!("geometry {width}x{height} is too large"))
        })?;
        let per_row = width / size;
        let per_column = height / size;

        let mut cells = Vec::with_capacity(area);
        let mut line = Vec::with_capacity(width);
        for block_row in 0..per_column {
            line.clear();
            for block_col in 0..per_row {
                let index = (block_row * per_row + block_col) % colors.get();
                line.extend(std::iter::repeat(index as u8).take(size));
            }
            // per_row >= 1, so the line is never empty here
            let last = line[line.len() - 1];
            line.resize(width, last);
            for _ in 0..size {
                cells.extend_from_slice(&line);
            }
        }
        // Replicate the last full row into the leftover rows
        let covered = per_column * size;
        for _ in covered..height {
            cells.extend_from_within((covered - 1) * width..covered * width);
        }

        log::debug!(
            "synthesized {}x{} picture: {} colors, block size {}, {}x{} blocks",
            width,
            height,
            colors,
            size,
            per_row,
            per_column
        );

        Ok(Self {
            width,
            height,
            block_size: size,
            cells,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Color index at column `x`, row `y`.
    #[must_use]
    pub fn index_at(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    /// Row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.width)
    }
}
