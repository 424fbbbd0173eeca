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

//! In-process converter for lossless formats.
//!
//! Supports PPM (`P6`, max value 255, concatenated frames) and PNG as both
//! input and output, plus headerless `rgb` as output. PNG inputs of any
//! color type and bit depth are normalized to 8-bit RGB; alpha is dropped.
//! Lossy and palette formats (GIF, JPEG, ...) are rejected, so dumps still
//! need an external converter.

use crate::converter::{Converter, Transcode, FORMAT_PPM, FORMAT_RGB};
use crate::ppm::{self, RawFrame};
use crate::{Error, Result};

const FORMAT_PNG: &str = "png";
const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Converter for PPM, PNG and raw RGB that never spawns a process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConverter;

impl NativeConverter {
    fn decode(input: &[u8], source: Option<&str>) -> Result<Vec<RawFrame>> {
        let format = match source {
            Some(format) => format.to_ascii_lowercase(),
            None => sniff(input)?.to_string(),
        };
        match format.as_str() {
            FORMAT_PPM => ppm::decode_frames(input),
            FORMAT_PNG => Ok(vec![decode_png(input)?]),
            other => Err(Error::UnsupportedFormat(format!(
                "native converter cannot read {other}"
            ))),
        }
    }

    fn select(frames: Vec<RawFrame>, frame: usize) -> Result<RawFrame> {
        let count = frames.len();
        frames.into_iter().nth(frame).ok_or_else(|| {
            Error::UnsupportedFormat(format!("frame {frame} requested, image has {count}"))
        })
    }
}

impl Converter for NativeConverter {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        let frame = Self::select(Self::decode(image, None)?, frame)?;
        Ok((frame.width, frame.height))
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        let frames = Self::decode(input, request.source)?;
        let frames = match request.frame {
            Some(index) => vec![Self::select(frames, index)?],
            None => frames,
        };

        let target = request.target.to_ascii_lowercase();
        let mut out = Vec::new();
        for frame in &frames {
            match target.as_str() {
                FORMAT_RGB => out.extend_from_slice(&frame.rgb),
                FORMAT_PPM => {
                    out.extend_from_slice(
                        format!("P6\n{} {}\n255\n", frame.width, frame.height).as_bytes(),
                    );
                    out.extend_from_slice(&frame.rgb);
                }
                // PNG holds a single frame
                FORMAT_PNG => return encode_png(frame),
                other => {
                    return Err(Error::UnsupportedFormat(format!(
                        "native converter cannot write {other}"
                    )))
                }
            }
        }
        Ok(out)
    }
}

fn sniff(input: &[u8]) -> Result<&'static str> {
    if input.starts_with(PNG_SIGNATURE) {
        Ok(FORMAT_PNG)
    } else if input.starts_with(b"P6") {
        Ok(FORMAT_PPM)
    } else {
        Err(Error::UnsupportedFormat(
            "native converter only detects PNG and binary PPM".to_string(),
        ))
    }
}

/// Decodes the first PNG frame to tightly packed RGB8.
fn decode_png(input: &[u8]) -> Result<RawFrame> {
    let mut decoder = png::Decoder::new(input);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let width = info.width as usize;
    let height = info.height as usize;
    let rgb = match info.color_type {
        png::ColorType::Rgb => buf,
        png::ColorType::Rgba => buf
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(Error::UnsupportedFormat(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };

    Ok(RawFrame { width, height, rgb })
}

#[allow(clippy::cast_possible_truncation)] // PNG dimensions are u32
fn encode_png(frame: &RawFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, frame.width as u32, frame.height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.rgb)?;
    writer.finish()?;
    Ok(out)
}
