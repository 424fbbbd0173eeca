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

//! Synthetic round trip measuring how many palette bytes survive a format.
//!
//! A known palette plays the part of leaked memory: the block picture is
//! drawn with it, converted to the format under test, decoded again and
//! recovered. Every byte that differs from the known palette is an error.

use std::fmt;

use crate::config::{ColorCount, Format, Geometry};
use crate::converter::{Converter, Transcode, FORMAT_PPM};
use crate::loader::load_picture;
use crate::picture::Picture;
use crate::ppm::encode_ppm;
use crate::recover::recover;
use crate::{Error, Result, Rgb};

/// How the intermediate image is produced.
#[derive(Debug, Clone)]
pub struct AccuracyOptions {
    pub format: Format,
    /// Passed to the converter as `-quality`.
    pub quality: Option<u32>,
    pub colors: ColorCount,
}

/// Outcome of one round trip.
#[derive(Debug, Clone)]
pub struct AccuracyReport {
    /// Palette bytes compared, `colors * 3`.
    pub total: usize,
    /// Bytes recovered wrong, unknown slots included.
    pub errors: usize,
    /// The converted picture, for saving.
    pub image: Vec<u8>,
}

impl AccuracyReport {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn error_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.errors as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "test completed, {} bytes total, {} recovered wrong ({:.2}%)",
            self.total,
            self.errors,
            self.error_percent()
        )
    }
}

/// Runs `palette` through `converter` in `options.format` and back.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `palette` has fewer entries than
/// `options.colors`, and propagates synthesis, converter and loader errors.
pub fn test_recover<C: Converter + ?Sized>(
    converter: &C,
    palette: &[Rgb],
    geometry: Geometry,
    options: &AccuracyOptions,
) -> Result<AccuracyReport> {
    let colors = options.colors.get();
    if palette.len() < colors {
        return Err(Error::InvalidConfig(format!(
            "test palette has {} entries, {} colors requested",
            palette.len(),
            colors
        )));
    }

    let picture = Picture::synthesize(geometry.width, geometry.height, options.colors)?;
    let ppm = encode_ppm(palette, &picture);
    let image = converter.transcode(
        &ppm,
        &Transcode {
            source: Some(FORMAT_PPM),
            target: options.format.as_str(),
            frame: None,
            quality: options.quality,
        },
    )?;
    log::debug!(
        "converted {} test picture to {} ({} bytes)",
        geometry,
        options.format,
        image.len()
    );

    let grid = load_picture(converter, &image, 0)?;
    let recovered = recover(&grid, options.colors)?;

    Ok(AccuracyReport {
        total: colors * 3,
        errors: recovered.mismatches(&palette[..colors]),
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = AccuracyReport {
            total: 768,
            errors: 13,
            image: Vec::new(),
        };
        assert_eq!(
            report.to_string(),
            "test completed, 768 bytes total, 13 recovered wrong (1.69%)"
        );
    }

    #[test]
    fn test_short_palette_rejected() {
        let options = AccuracyOptions {
            format: "png".parse().unwrap(),
            quality: None,
            colors: ColorCount::new(4).unwrap(),
        };
        let err = test_recover(
            &crate::native::NativeConverter,
            &[[0, 0, 0]; 3],
            Geometry::new(8, 8).unwrap(),
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
