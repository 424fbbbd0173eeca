//! End-to-end dump generation and recovery against stub converters.
//!
//! Run the ImageMagick-backed test explicitly:
//! `cargo test --test roundtrip -- --ignored`

mod common;

use common::{FailingConverter, FakeMagick, NoisyConverter, ShortRawConverter};
use gifoeb::dump::cache_filler;
use gifoeb::gif::{ScreenDescriptor, FLAGS_OFFSET, HEADER_LEN};
use gifoeb::palette::{grayscale_palette, lorem_palette, random_palette};
use gifoeb::ppm::{decode_frames, encode_ppm};
use gifoeb::{
    generate_dump, load_picture, recover, test_recover, AccuracyOptions, ColorCount,
    DumpRequest, Error, Geometry, NativeConverter, PaletteSlot, Picture, PixelGrid,
    ProcessConverter, Tool,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn geometry(w: usize, h: usize) -> Geometry {
    Geometry::new(w, h).unwrap()
}

fn colors(n: usize) -> ColorCount {
    ColorCount::new(n).unwrap()
}

fn options(format: &str, n: usize) -> AccuracyOptions {
    AccuracyOptions {
        format: format.parse().unwrap(),
        quality: None,
        colors: colors(n),
    }
}

#[test]
fn test_lossless_recovery_is_exact() {
    let palette = lorem_palette();
    let picture = Picture::synthesize(500, 500, ColorCount::MAX).unwrap();
    let ppm = encode_ppm(&palette, &picture);
    let frame = &decode_frames(&ppm).unwrap()[0];
    let grid = PixelGrid::from_rgb(frame.width, frame.height, &frame.rgb).unwrap();

    let recovered = recover(&grid, ColorCount::MAX).unwrap();
    assert_eq!(recovered.len(), 256);
    for (slot, expected) in recovered.slots().iter().zip(&palette) {
        assert_eq!(*slot, PaletteSlot::Known(*expected));
    }
}

#[test]
fn test_png_accuracy_is_perfect() {
    let palette = random_palette(&mut StdRng::seed_from_u64(3));
    let report = test_recover(
        &NativeConverter,
        &palette,
        geometry(500, 500),
        &options("png", 256),
    )
    .unwrap();

    assert_eq!(report.total, 768);
    assert_eq!(report.errors, 0);
    assert!(report.image.starts_with(b"\x89PNG"));
}

#[test]
fn test_noisy_accuracy_above_threshold() {
    let report = test_recover(
        &NoisyConverter::sparse(),
        &lorem_palette(),
        geometry(500, 500),
        &options("ppm", 256),
    )
    .unwrap();

    assert!(
        report.error_percent() <= 5.0,
        "too many errors: {report}"
    );
}

#[test]
fn test_vote_survives_heavy_scattered_noise() {
    // 3 of every 7 pixels damaged; 500 % 7 shifts the pattern each row, so a
    // 16-pixel block row loses 6 to 8 pixels, spread over 13 wrong colors
    let converter = NoisyConverter {
        period: 7,
        damaged: 3,
        spread: 13,
    };
    let report = test_recover(
        &converter,
        &lorem_palette(),
        geometry(500, 500),
        &options("ppm", 256),
    )
    .unwrap();
    assert_eq!(report.errors, 0, "{report}");
}

#[test]
fn test_vote_follows_consistent_majority_damage() {
    // 3 of every 5 columns shifted to one wrong color: it outvotes the
    // true color in every block, so red and blue are wrong everywhere
    let converter = NoisyConverter {
        period: 5,
        damaged: 3,
        spread: 1,
    };
    let report = test_recover(
        &converter,
        &lorem_palette(),
        geometry(500, 500),
        &options("ppm", 256),
    )
    .unwrap();
    assert_eq!(report.errors, 512, "{report}");
    assert!(report.error_percent() > 5.0);
}

#[test]
fn test_partial_palette_accuracy() {
    let report = test_recover(
        &NativeConverter,
        &lorem_palette(),
        geometry(37, 23),
        &options("png", 17),
    )
    .unwrap();
    assert_eq!(report.total, 51);
    assert_eq!(report.errors, 0);
}

#[test]
fn test_dump_full_table() {
    let converter = FakeMagick::default();
    let request = DumpRequest::new(geometry(64, 48));
    let dump = generate_dump(&converter, &request, &mut StdRng::seed_from_u64(9)).unwrap();

    let descriptor = ScreenDescriptor::parse(&dump).unwrap();
    assert_eq!(dump[FLAGS_OFFSET], 0x77);
    assert!(!descriptor.has_global_table());
    // Size bits still declare 256 entries
    assert_eq!(descriptor.global_table_entries(), 256);
    assert_eq!((descriptor.width, descriptor.height), (64, 48));

    let filler = cache_filler(&mut StdRng::seed_from_u64(9));
    assert_eq!(&dump[HEADER_LEN..HEADER_LEN + 3], &[0x21, 0xFE, 0x20]);
    assert_eq!(&dump[HEADER_LEN + 3..HEADER_LEN + 35], &filler);
    assert_eq!(dump[HEADER_LEN + 35], 0x00);
    // Image descriptor follows the comment directly
    assert_eq!(dump[HEADER_LEN + 36], 0x2C);
    assert_eq!(*dump.last().unwrap(), 0x3B);

    // The converter saw a single grayscale frame
    let inputs = converter.inputs.borrow();
    assert_eq!(inputs.len(), 1);
    let frames = decode_frames(&inputs[0]).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(&frames[0].rgb[..3], &[0, 0, 0]);
}

#[test]
fn test_dump_two_colors() {
    let converter = FakeMagick::default();
    let request = DumpRequest {
        geometry: geometry(16, 16),
        colors: colors(2),
        animate: false,
    };
    let dump = generate_dump(&converter, &request, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(dump[FLAGS_OFFSET], 0x70);
    assert_eq!(ScreenDescriptor::parse(&dump).unwrap().global_table_entries(), 2);
}

#[test]
fn test_dump_odd_color_count_uses_power_of_two_table() {
    let converter = FakeMagick::default();
    let request = DumpRequest {
        geometry: geometry(40, 40),
        colors: colors(5),
        animate: false,
    };
    let dump = generate_dump(&converter, &request, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(dump[FLAGS_OFFSET], 0x72);
}

#[test]
fn test_dump_animation_doubles_frames() {
    let converter = FakeMagick::default();
    let request = DumpRequest {
        geometry: geometry(32, 32),
        colors: colors(16),
        animate: true,
    };
    let dump = generate_dump(&converter, &request, &mut StdRng::seed_from_u64(5)).unwrap();

    let inputs = converter.inputs.borrow();
    let frames = decode_frames(&inputs[0]).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], frames[1]);
    assert_eq!(dump[FLAGS_OFFSET], 0x73);
}

#[test]
fn test_dumps_differ_between_generations() {
    let converter = FakeMagick::default();
    let request = DumpRequest::new(geometry(64, 64));
    let mut rng = StdRng::seed_from_u64(11);
    let a = generate_dump(&converter, &request, &mut rng).unwrap();
    let b = generate_dump(&converter, &request, &mut rng).unwrap();
    assert_eq!(a.len(), b.len());
    assert_ne!(a, b);
}

#[test]
fn test_dump_rejects_unexpected_flags() {
    let converter = FakeMagick::sorted();
    let request = DumpRequest::new(geometry(64, 64));
    let err = generate_dump(&converter, &request, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(
        err,
        Error::HeaderMismatch {
            expected: 0xF7,
            found: 0xFF,
            ..
        }
    ));
}

#[test]
fn test_dump_too_small_never_calls_converter() {
    let converter = FakeMagick::default();
    let request = DumpRequest::new(geometry(15, 15));
    let err = generate_dump(&converter, &request, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(err, Error::PictureTooSmall { colors: 256, .. }));
    assert!(converter.inputs.borrow().is_empty());
}

#[test]
fn test_converter_failure_propagates() {
    let request = DumpRequest::new(geometry(64, 64));
    let err =
        generate_dump(&FailingConverter, &request, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(
        err,
        Error::ConverterFailed {
            operation: "convert",
            ..
        }
    ));

    let err = load_picture(&FailingConverter, b"anything", 0).unwrap_err();
    assert!(matches!(
        err,
        Error::ConverterFailed {
            operation: "identify",
            ..
        }
    ));
}

#[test]
fn test_loader_rejects_short_raw_buffer() {
    let picture = Picture::synthesize(20, 10, colors(4)).unwrap();
    let ppm = encode_ppm(&grayscale_palette(4), &picture);
    let err = load_picture(&ShortRawConverter, &ppm, 0).unwrap_err();
    assert!(matches!(
        err,
        Error::BufferLength {
            expected: 600,
            actual: 599,
            ..
        }
    ));
}

#[test]
fn test_loader_reads_second_frame() {
    let picture = Picture::synthesize(20, 10, colors(4)).unwrap();
    let mut data = encode_ppm(&grayscale_palette(4), &picture);
    data.extend_from_slice(&encode_ppm(&lorem_palette(), &picture));

    let grid = load_picture(&NativeConverter, &data, 1).unwrap();
    let recovered = recover(&grid, colors(4)).unwrap();
    assert_eq!(recovered.to_bytes(), gifoeb::palette::palette_bytes(&lorem_palette()[..4]));
}

/// Needs ImageMagick's `convert` and `identify` on `PATH`.
#[test]
#[ignore = "requires ImageMagick"]
fn test_imagemagick_jpeg_accuracy() {
    let converter = ProcessConverter::new(Tool::ImageMagick);
    let report = test_recover(
        &converter,
        &lorem_palette(),
        geometry(500, 500),
        &options("jpeg", 256),
    )
    .unwrap();
    println!("{report}");
    assert!(report.error_percent() <= 5.0, "{report}");
}
