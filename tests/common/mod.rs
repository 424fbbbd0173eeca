//! Stub converters for integration tests.
//!
//! None of these spawn a process. `FakeMagick` imitates the one behavior of
//! ImageMagick the dump relies on (a GIF whose global table is sized to the
//! colors in use); the others wrap `NativeConverter` to inject failures and
//! noise.

#![allow(dead_code)]

use std::cell::RefCell;

use gifoeb::ppm::decode_frames;
use gifoeb::{Converter, Error, NativeConverter, Result, Transcode};

/// Produces minimal GIFs from PPM input and records every input it sees.
#[derive(Default)]
pub struct FakeMagick {
    /// Set the sort bit, which no supported converter does.
    pub sorted: bool,
    pub inputs: RefCell<Vec<Vec<u8>>>,
}

impl FakeMagick {
    pub fn sorted() -> Self {
        Self {
            sorted: true,
            ..Self::default()
        }
    }

    fn encode_gif(&self, input: &[u8]) -> Result<Vec<u8>> {
        let frames = decode_frames(input)?;
        let first = &frames[0];

        let mut table: Vec<[u8; 3]> = Vec::new();
        for px in first.rgb.chunks_exact(3) {
            let rgb = [px[0], px[1], px[2]];
            if !table.contains(&rgb) {
                table.push(rgb);
            }
        }
        let mut size_bits = 0u8;
        while (2usize << size_bits) < table.len() {
            size_bits += 1;
        }
        table.resize(2 << size_bits, [0, 0, 0]);

        let mut gif = b"GIF89a".to_vec();
        gif.extend_from_slice(&(first.width as u16).to_le_bytes());
        gif.extend_from_slice(&(first.height as u16).to_le_bytes());
        let sort = if self.sorted { 0x08 } else { 0x00 };
        gif.push(0xF0 | sort | size_bits);
        gif.extend_from_slice(&[0x00, 0x00]);
        for rgb in &table {
            gif.extend_from_slice(rgb);
        }
        // One image descriptor per frame; the pixel data itself is irrelevant
        for _ in &frames {
            gif.extend_from_slice(&[0x2C, 0, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x02, 0x00]);
        }
        gif.push(0x3B);
        Ok(gif)
    }
}

impl Converter for FakeMagick {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        NativeConverter.identify(image, frame)
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        self.inputs.borrow_mut().push(input.to_vec());
        if request.target.eq_ignore_ascii_case("gif") {
            self.encode_gif(input)
        } else {
            NativeConverter.transcode(input, request)
        }
    }
}

/// Every call fails the way a crashed converter does.
pub struct FailingConverter;

impl Converter for FailingConverter {
    fn identify(&self, _image: &[u8], _frame: usize) -> Result<(usize, usize)> {
        Err(Error::ConverterFailed {
            operation: "identify",
            code: Some(1),
            stderr: "no decode delegate".to_string(),
        })
    }

    fn transcode(&self, _input: &[u8], _request: &Transcode<'_>) -> Result<Vec<u8>> {
        Err(Error::ConverterFailed {
            operation: "convert",
            code: Some(1),
            stderr: "no decode delegate".to_string(),
        })
    }
}

/// Lossless native conversion, then deterministic damage to decoded pixels
/// the way JPEG blurs and shifts colors.
pub struct NoisyConverter {
    /// Out of every `period` consecutive pixels the first `damaged` are
    /// disturbed.
    pub period: usize,
    pub damaged: usize,
    /// Number of distinct disturbances. With 1, every damaged pixel of a
    /// color lands on the same wrong color.
    pub spread: usize,
}

impl NoisyConverter {
    pub fn sparse() -> Self {
        Self {
            period: 5,
            damaged: 1,
            spread: 7,
        }
    }
}

impl Converter for NoisyConverter {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        NativeConverter.identify(image, frame)
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        let mut out = NativeConverter.transcode(input, request)?;
        if request.target.eq_ignore_ascii_case("rgb") {
            for (i, px) in out.chunks_exact_mut(3).enumerate() {
                if i % self.period < self.damaged {
                    px[0] = px[0].wrapping_add(3);
                    px[2] = px[2].wrapping_sub((i % self.spread) as u8 + 1);
                }
            }
        }
        Ok(out)
    }
}

/// Returns raw data one byte short of the identified geometry.
pub struct ShortRawConverter;

impl Converter for ShortRawConverter {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        NativeConverter.identify(image, frame)
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        let mut out = NativeConverter.transcode(input, request)?;
        out.pop();
        Ok(out)
    }
}
