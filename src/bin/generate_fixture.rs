//! Test Fixture Generator
//!
//! Generates the deterministic "leaked" picture used by the golden recovery
//! test. It stands in for what a vulnerable converter returns after reading
//! a 500x500 dump: the block picture drawn with the "Lorem ipsum" palette as
//! the memory contents, saved losslessly.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_fixture
//! ```
//!
//! # Generated Files
//!
//! - `tests/fixtures/leak_500x500.png`
//!   - 500x500 RGB, 256 colors, block size 16 (31x31 blocks)
//!   - Rows and columns 496..500 repeat the last block row/column

use gifoeb::converter::{Transcode, FORMAT_PPM};
use gifoeb::palette::lorem_palette;
use gifoeb::ppm::encode_ppm;
use gifoeb::{ColorCount, Converter, NativeConverter, Picture};

const PATH: &str = "tests/fixtures/leak_500x500.png";

fn main() -> gifoeb::Result<()> {
    let picture = Picture::synthesize(500, 500, ColorCount::MAX)?;
    let ppm = encode_ppm(&lorem_palette(), &picture);

    let png = NativeConverter.transcode(
        &ppm,
        &Transcode {
            source: Some(FORMAT_PPM),
            target: "png",
            ..Default::default()
        },
    )?;

    std::fs::create_dir_all("tests/fixtures")?;
    std::fs::write(PATH, &png)?;
    println!("Generated {PATH} ({} bytes)", png.len());
    Ok(())
}
