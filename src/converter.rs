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

//! Image converter backends.
//!
//! Dump generation and recovery never touch image formats other than PPM
//! and raw RGB themselves; everything else goes through a [`Converter`].
//! [`ProcessConverter`] shells out to ImageMagick or GraphicsMagick, one
//! blocking request/response exchange per call with no timeout and no
//! retries. [`NativeConverter`](crate::native::NativeConverter) handles the
//! lossless formats in process.

use std::fmt;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::native::NativeConverter;
use crate::{Error, Result};

/// Raw PPM, the format pictures are handed to converters in.
pub const FORMAT_PPM: &str = "ppm";
/// Target format of dumps.
pub const FORMAT_GIF: &str = "gif";
/// Headerless packed RGB, the format pictures are read back in.
pub const FORMAT_RGB: &str = "rgb";

/// One transcoding request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transcode<'a> {
    /// Input format, or `None` to let the converter sniff it.
    pub source: Option<&'a str>,
    pub target: &'a str,
    /// Frame of a multi-frame input to convert, or all frames.
    pub frame: Option<usize>,
    /// Encoder quality passed through as `-quality`.
    pub quality: Option<u32>,
}

/// Identify and transcode images.
///
/// Implementations must be deterministic enough that the same request
/// yields the same geometry; the recovery engine depends on it.
pub trait Converter {
    /// Width and height of `frame` in `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be read or the converter fails.
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)>;

    /// Converts `input` as described by `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails.
    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>>;
}

impl<C: Converter + ?Sized> Converter for &C {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        (**self).identify(image, frame)
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        (**self).transcode(input, request)
    }
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        (**self).identify(image, frame)
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        (**self).transcode(input, request)
    }
}

/// Which converter implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// ImageMagick: `convert`, `identify`.
    #[default]
    ImageMagick,
    /// GraphicsMagick: `gm convert`, `gm identify`.
    GraphicsMagick,
    /// In-process lossless formats only.
    Native,
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "IM" => Ok(Tool::ImageMagick),
            "GM" => Ok(Tool::GraphicsMagick),
            "NATIVE" => Ok(Tool::Native),
            _ => Err(Error::InvalidConfig(format!(
                "tool must be 'IM', 'GM' or 'native', got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tool::ImageMagick => "IM",
            Tool::GraphicsMagick => "GM",
            Tool::Native => "native",
        })
    }
}

/// Builds the converter for `tool`.
#[must_use]
pub fn converter_for(tool: Tool) -> Box<dyn Converter> {
    match tool {
        Tool::ImageMagick | Tool::GraphicsMagick => Box::new(ProcessConverter::new(tool)),
        Tool::Native => Box::new(NativeConverter),
    }
}

/// Converter backed by ImageMagick or GraphicsMagick executables reading
/// stdin and writing stdout.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    graphics_magick: bool,
}

impl ProcessConverter {
    /// `Tool::Native` falls back to ImageMagick.
    #[must_use]
    pub fn new(tool: Tool) -> Self {
        Self {
            graphics_magick: tool == Tool::GraphicsMagick,
        }
    }

    fn command(&self, subcommand: &str) -> Command {
        if self.graphics_magick {
            let mut command = Command::new("gm");
            command.arg(subcommand);
            command
        } else {
            Command::new(subcommand)
        }
    }

    /// Feeds `input` to the process, collects stdout and requires exit code 0.
    fn run(&self, operation: &'static str, mut command: Command, input: &[u8]) -> Result<Vec<u8>> {
        log::debug!("running {:?} with {} bytes of input", command, input.len());

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn { operation, source })?;
        let mut stdin = child.stdin.take().ok_or_else(|| Error::Spawn {
            operation,
            source: io::Error::other("stdin not captured"),
        })?;

        // Write from a second thread so a converter that streams output
        // before consuming all input cannot fill both pipes.
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, output)
        });
        let output = output.map_err(|source| Error::Spawn { operation, source })?;

        if !output.status.success() {
            return Err(Error::ConverterFailed {
                operation,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(|source| Error::Spawn { operation, source })?;

        log::debug!("{} produced {} bytes", operation, output.stdout.len());
        Ok(output.stdout)
    }
}

/// `<format>:-[frame]`, or `-[frame]` when the format is sniffed.
fn input_spec(source: Option<&str>, frame: Option<usize>) -> String {
    let mut spec = match source {
        Some(format) => format!("{format}:-"),
        None => "-".to_string(),
    };
    if let Some(frame) = frame {
        spec.push_str(&format!("[{frame}]"));
    }
    spec
}

/// Parses `identify -format "%w %h"` output.
pub(crate) fn parse_identify(stdout: &[u8]) -> Result<(usize, usize)> {
    let text = String::from_utf8_lossy(stdout);
    let mut fields = text.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(Ok(w)), Some(Ok(h)), None) => Ok((w, h)),
        _ => Err(Error::MalformedIdentify(text.trim().to_string())),
    }
}

impl Converter for ProcessConverter {
    fn identify(&self, image: &[u8], frame: usize) -> Result<(usize, usize)> {
        let mut command = self.command("identify");
        command
            .args(["-format", "%w %h"])
            .arg(input_spec(None, Some(frame)));
        let stdout = self.run("identify", command, image)?;
        parse_identify(&stdout)
    }

    fn transcode(&self, input: &[u8], request: &Transcode<'_>) -> Result<Vec<u8>> {
        let mut command = self.command("convert");
        command.arg(input_spec(request.source, request.frame));
        if let Some(quality) = request.quality {
            command.arg("-quality").arg(quality.to_string());
        }
        command.arg(format!("{}:-", request.target));
        self.run("convert", command, input)
    }
}
