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

//! Palettes: the ground-truth tables fed into pictures and the recovered
//! tables produced by voting.

use rand::Rng;

use crate::config::MAX_COLORS;
use crate::Rgb;

/// Text used as emulated memory contents by the accuracy tester.
const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit,
sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut
enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi
ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit
in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur
sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt
mollit anim id est laborum.";

/// Grayscale table `(i, i, i)` with `len` entries.
///
/// Used as the placeholder palette for dumps: its values never survive into
/// the patched image.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // len <= 256
pub fn grayscale_palette(len: usize) -> Vec<Rgb> {
    (0..len.min(MAX_COLORS)).map(|i| [i as u8; 3]).collect()
}

/// 256 entries of uniformly random bytes.
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> Vec<Rgb> {
    (0..MAX_COLORS).map(|_| rng.gen()).collect()
}

/// 256 entries spelling out repeated "Lorem ipsum" text, three characters per
/// entry.
#[must_use]
pub fn lorem_palette() -> Vec<Rgb> {
    let bytes: Vec<u8> = LOREM.bytes().cycle().take(MAX_COLORS * 3).collect();
    bytes
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect()
}

/// Flattens a palette into `len * 3` bytes, channel-major per entry.
#[must_use]
pub fn palette_bytes(palette: &[Rgb]) -> Vec<u8> {
    palette.iter().flatten().copied().collect()
}

/// One entry of a recovered palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteSlot {
    /// The elected color for this index.
    Known(Rgb),
    /// No pixel was attributed to this index.
    Unknown,
}

impl PaletteSlot {
    #[must_use]
    pub fn known(self) -> Option<Rgb> {
        match self {
            PaletteSlot::Known(rgb) => Some(rgb),
            PaletteSlot::Unknown => None,
        }
    }
}

/// Palette reconstructed by the recovery engine, indexed like the leaked table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredPalette {
    slots: Vec<PaletteSlot>,
}

impl RecoveredPalette {
    #[must_use]
    pub fn new(slots: Vec<PaletteSlot>) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn slots(&self) -> &[PaletteSlot] {
        &self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, PaletteSlot::Unknown))
            .count()
    }

    /// Flat `len * 3` byte dump. Unknown slots are written as zero bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.slots
            .iter()
            .flat_map(|slot| slot.known().unwrap_or([0; 3]))
            .collect()
    }

    /// Counts channel bytes that differ from `truth`. Unknown slots count as
    /// three mismatches.
    #[must_use]
    pub fn mismatches(&self, truth: &[Rgb]) -> usize {
        self.slots
            .iter()
            .zip(truth)
            .map(|(slot, expected)| match slot {
                PaletteSlot::Known(rgb) => rgb.iter().zip(expected).filter(|(a, b)| a != b).count(),
                PaletteSlot::Unknown => 3,
            })
            .sum()
    }
}
