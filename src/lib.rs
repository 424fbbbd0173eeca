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

//! Uninitialized GIF palette disclosure in ImageMagick and GraphicsMagick.
//!
//! Some converter versions allocate a GIF's global color table from the
//! header's size bits but only fill it when the table-present bit is set.
//! A GIF that declares a table size, clears the bit and omits the table gets
//! its pixels rendered through uninitialized memory, and re-encoding the
//! result (thumbnailing, format conversion) hands that memory back.
//!
//! This crate covers both halves:
//!
//! - [`generate_dump`] draws a picture in which every palette index owns
//!   large square blocks, has a [`Converter`] turn it into a GIF and patches
//!   the header so the table is declared but missing.
//! - [`recover`] takes the converted picture (loaded via [`load_picture`]),
//!   re-derives the same block layout and elects each palette entry by
//!   majority vote over its pixels, which tolerates lossy re-encoding.
//!
//! [`test_recover`] measures the recovery error rate for a format with a
//! known palette standing in for leaked memory.
//!
//! # Example
//!
//! ```no_run
//! use gifoeb::{converter_for, generate_dump, DumpRequest, Geometry, Tool};
//!
//! # fn main() -> gifoeb::Result<()> {
//! let converter = converter_for(Tool::ImageMagick);
//! let request = DumpRequest::new(Geometry::new(500, 500)?);
//! let gif = generate_dump(&converter, &request, &mut rand::thread_rng())?;
//! std::fs::write("dump.gif", gif)?;
//! # Ok(())
//! # }
//! ```

pub mod accuracy;
pub mod config;
pub mod converter;
pub mod dump;
pub mod error;
pub mod gif;
pub mod loader;
pub mod native;
pub mod palette;
pub mod picture;
pub mod ppm;
pub mod recover;

/// One palette entry, `[r, g, b]`.
pub type Rgb = [u8; 3];

pub use crate::accuracy::{test_recover, AccuracyOptions, AccuracyReport};
pub use crate::config::{ColorCount, Format, Geometry};
pub use crate::converter::{converter_for, Converter, ProcessConverter, Tool, Transcode};
pub use crate::dump::{generate_dump, DumpRequest};
pub use crate::error::{Error, Result};
pub use crate::loader::{load_picture, PixelGrid};
pub use crate::native::NativeConverter;
pub use crate::palette::{PaletteSlot, RecoveredPalette};
pub use crate::picture::Picture;
pub use crate::recover::{recover, AttributionMultiset};
