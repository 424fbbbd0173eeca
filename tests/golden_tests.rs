// Golden tests for raw picture encoding and palette recovery
// Run normally: cargo test --test golden_tests
// Generate expected outputs: cargo test --test golden_tests --features generate-golden
//
// Raw buffers are fully deterministic, so unlike compressed formats a single
// set of expected files serves every platform.

use gifoeb::palette::{grayscale_palette, lorem_palette};
use gifoeb::ppm::encode_ppm;
use gifoeb::{load_picture, recover, ColorCount, NativeConverter, Picture};

#[cfg(feature = "generate-golden")]
use std::path::Path;

const EXPECTED_DIR: &str = "tests/expected";

/// Compare or generate golden output
fn golden_check(name: &str, data: &[u8]) {
    let path = format!("{EXPECTED_DIR}/{name}");

    #[cfg(feature = "generate-golden")]
    {
        if let Some(parent) = Path::new(&path).parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, data).unwrap();
        println!("Generated: {} ({} bytes)", path, data.len());
    }

    #[cfg(not(feature = "generate-golden"))]
    {
        let expected = std::fs::read(&path).unwrap_or_else(|e| {
            panic!(
                "Failed to read {}: {}. Run with --features generate-golden to create it.",
                path, e
            )
        });
        assert_eq!(data, &expected[..], "Mismatch in {}", name);
    }
}

fn load_leak_500x500() -> Vec<u8> {
    std::fs::read("tests/fixtures/leak_500x500.png")
        .expect("Run 'cargo run --bin generate_fixture' first")
}

#[test]
fn golden_ppm_64x64_four_colors() {
    let picture = Picture::synthesize(64, 64, ColorCount::new(4).unwrap()).unwrap();
    golden_check("picture_64x64_c4.ppm", &encode_ppm(&lorem_palette(), &picture));
}

#[test]
fn golden_ppm_100x75_full_table() {
    // Non-power-of-two geometry exercises the replicated edge rows/columns
    let picture = Picture::synthesize(100, 75, ColorCount::MAX).unwrap();
    golden_check(
        "picture_100x75_c256.ppm",
        &encode_ppm(&grayscale_palette(256), &picture),
    );
}

#[test]
fn golden_recover_leak_500x500() {
    let image = load_leak_500x500();
    let grid = load_picture(&NativeConverter, &image, 0).unwrap();
    assert_eq!((grid.width(), grid.height()), (500, 500));

    let palette = recover(&grid, ColorCount::MAX).unwrap();
    assert_eq!(palette.unknown_count(), 0);
    golden_check("leak_500x500.palette", &palette.to_bytes());
}
