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

//! Loading arbitrary images back into RGB pixel grids.

use crate::converter::{Converter, Transcode, FORMAT_RGB};
use crate::{Error, Result, Rgb};

/// Decoded `height x width` grid of RGB pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    /// Wraps packed RGB bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferLength`] unless `rgb` holds exactly
    /// `width * height * 3` bytes.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Result<Self> {
        let expected = width.checked_mul(height).and_then(|n| n.checked_mul(3));
        if expected != Some(rgb.len()) {
            return Err(Error::BufferLength {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                actual: rgb.len(),
            });
        }
        let pixels = rgb.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self {
            width,
            height,
            pixels,
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
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Row-major pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}

/// Decodes frame `frame` of `image` through `converter`.
///
/// # Errors
///
/// Propagates converter failures and returns [`Error::BufferLength`] if the
/// raw output does not match the identified geometry.
pub fn load_picture<C: Converter + ?Sized>(
    converter: &C,
    image: &[u8],
    frame: usize,
) -> Result<PixelGrid> {
    let (width, height) = converter.identify(image, frame)?;
    log::debug!("identified frame {frame} as {width}x{height}");

    let rgb = converter.transcode(
        image,
        &Transcode {
            source: None,
            target: FORMAT_RGB,
            frame: Some(frame),
            quality: None,
        },
    )?;
    PixelGrid::from_rgb(width, height, &rgb)
}
