//! End-to-end codec integration tests.
//!
//! Tests for the full encode/decode pipeline across color spaces, sample
//! ranges, bit depths and subsampling schemes.

use chromapack::{CodecOptions, ColorRange, ColorSpace, Decoder, Encoder, RgbFrame, SubsamplingScheme};

/// Create a test frame with uniform color.
fn create_uniform_frame(width: u32, height: u32, value: u16) -> RgbFrame {
    let pixels = vec![[value; 3]; width as usize * height as usize];
    RgbFrame::new(width, height, pixels).expect("pixel count matches shape")
}

/// Create a test frame with a gray gradient pattern.
fn create_gradient_frame(width: u32, height: u32, max_code: u16) -> RgbFrame {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let v = ((x + y) % (u32::from(max_code) + 1)) as u16;
                [v, v, v]
            })
        })
        .collect();
    RgbFrame::new(width, height, pixels).expect("pixel count matches shape")
}

/// Create a colorful test frame exercising all three channels.
fn create_color_frame(width: u32, height: u32) -> RgbFrame {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let r = ((x * 13) % 256) as u16;
                let g = ((y * 29) % 256) as u16;
                let b = ((x * 7 + y * 3) % 256) as u16;
                [r, g, b]
            })
        })
        .collect();
    RgbFrame::new(width, height, pixels).expect("pixel count matches shape")
}

/// The largest per-channel difference between two frames.
fn max_channel_error(a: &RgbFrame, b: &RgbFrame) -> u16 {
    a.pixels()
        .iter()
        .zip(b.pixels())
        .flat_map(|(pa, pb)| pa.iter().zip(pb.iter()).map(|(x, y)| x.abs_diff(*y)))
        .max()
        .unwrap_or(0)
}

// === Roundtrip Tests ===

/// Gray input at full range with an identity-level quantizer is lossless.
#[test]
fn test_full_range_gray_roundtrip_is_exact() {
    let options = CodecOptions::new()
        .range(ColorRange::Full)
        .scheme(SubsamplingScheme::S444)
        .levels(256);
    let encoder = Encoder::new(options).expect("valid options");
    let decoder = Decoder::new(options).expect("valid options");

    let frame = create_gradient_frame(32, 24, 255);
    let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");
    let decoded = decoder.decode(&bytes).expect("decode");

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0], frame);
}

/// The default narrow-range configuration stays within the quantizer step.
#[test]
fn test_default_options_roundtrip_stays_close() {
    let options = CodecOptions::default();
    let encoder = Encoder::new(options).expect("valid options");
    let decoder = Decoder::new(options).expect("valid options");

    let frame = create_gradient_frame(16, 16, 255);
    let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");
    let decoded = decoder.decode(&bytes).expect("decode");

    // 32 levels over 256 codes is an 8-code step; allow for the narrow
    // range rescale on top of it
    assert!(max_channel_error(&frame, &decoded[0]) <= 12);
}

/// BT.709 primaries roundtrip colored input through the matrix and back.
#[test]
fn test_bt709_color_roundtrip() {
    let options = CodecOptions::new()
        .color_space(ColorSpace::Bt709)
        .range(ColorRange::Full)
        .scheme(SubsamplingScheme::S444)
        .levels(256);
    let encoder = Encoder::new(options).expect("valid options");
    let decoder = Decoder::new(options).expect("valid options");

    let frame = create_color_frame(16, 12);
    let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");
    let decoded = decoder.decode(&bytes).expect("decode");

    assert!(max_channel_error(&frame, &decoded[0]) <= 3);
}

/// Ten-bit samples survive the pipeline within the level quantizer step.
#[test]
fn test_ten_bit_roundtrip() {
    let options = CodecOptions::new()
        .range(ColorRange::Full)
        .scheme(SubsamplingScheme::S444)
        .bit_depth(10)
        .levels(256);
    let encoder = Encoder::new(options).expect("valid options");
    let decoder = Decoder::new(options).expect("valid options");

    let frame = create_gradient_frame(16, 16, 1023);
    let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");
    let decoded = decoder.decode(&bytes).expect("decode");

    // 256 levels over 1024 codes is a four-code step
    assert!(max_channel_error(&frame, &decoded[0]) <= 4);
}

/// Every subsampling scheme restores the original frame shape.
#[test]
fn test_all_schemes_restore_shape() {
    for scheme in [
        SubsamplingScheme::S444,
        SubsamplingScheme::S422,
        SubsamplingScheme::S420,
    ] {
        let options = CodecOptions::new().scheme(scheme);
        let encoder = Encoder::new(options).expect("valid options");
        let decoder = Decoder::new(options).expect("valid options");

        let frame = create_gradient_frame(11, 7, 255);
        let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");
        let decoded = decoder.decode(&bytes).expect("decode");

        assert_eq!(decoded[0].width(), 11, "{scheme}");
        assert_eq!(decoded[0].height(), 7, "{scheme}");
    }
}

/// Frames of different shapes share one bundle and come back separable.
#[test]
fn test_multi_frame_bundle() {
    let options = CodecOptions::new()
        .range(ColorRange::Full)
        .scheme(SubsamplingScheme::S444)
        .levels(256);
    let encoder = Encoder::new(options).expect("valid options");
    let decoder = Decoder::new(options).expect("valid options");

    let frames = vec![
        create_gradient_frame(8, 6, 255),
        create_uniform_frame(12, 4, 200),
        create_color_frame(5, 9),
    ];
    let bytes = encoder.encode(&frames).expect("encode");
    let decoded = decoder.decode(&bytes).expect("decode");

    assert_eq!(decoded.len(), 3);
    for (orig, rec) in frames.iter().zip(&decoded) {
        assert_eq!(rec.width(), orig.width());
        assert_eq!(rec.height(), orig.height());
    }
    assert_eq!(decoded[0], frames[0]);
    assert_eq!(decoded[1], frames[1]);
}

// === Determinism Tests ===

/// Encoding the same input twice produces byte-identical bundles.
#[test]
fn test_encode_is_deterministic() {
    let encoder = Encoder::new(CodecOptions::default()).expect("valid options");
    let frame = create_color_frame(24, 18);

    let first = encoder.encode(std::slice::from_ref(&frame)).expect("encode");
    let second = encoder.encode(std::slice::from_ref(&frame)).expect("encode");

    assert_eq!(first, second);
}

// === Compression Tests ===

/// A uniform frame collapses to a near-degenerate symbol stream.
#[test]
fn test_uniform_frame_compresses() {
    let encoder = Encoder::new(CodecOptions::default()).expect("valid options");
    let frame = create_uniform_frame(64, 64, 120);
    let raw_bytes = 64 * 64 * 3 * 2;

    let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");

    assert!(
        bytes.len() * 4 < raw_bytes,
        "{} bytes for {raw_bytes} raw",
        bytes.len()
    );
}

// === Configuration Tests ===

/// Mismatched subsampling options fail cleanly instead of panicking.
#[test]
fn test_scheme_mismatch_is_an_error() {
    let encoder = Encoder::new(CodecOptions::new().scheme(SubsamplingScheme::S420))
        .expect("valid options");
    let decoder = Decoder::new(CodecOptions::new().scheme(SubsamplingScheme::S444))
        .expect("valid options");

    let frame = create_gradient_frame(16, 16, 255);
    let bytes = encoder.encode(std::slice::from_ref(&frame)).expect("encode");

    // the decoded chroma planes are too small to be fully sampled
    assert!(decoder.decode(&bytes).is_err());
}

/// Out-of-range options are rejected on construction.
#[test]
fn test_invalid_options_rejected() {
    assert!(Encoder::new(CodecOptions::new().bit_depth(7)).is_err());
    assert!(Encoder::new(CodecOptions::new().bit_depth(17)).is_err());
    assert!(Decoder::new(CodecOptions::new().levels(1)).is_err());
    assert!(Decoder::new(CodecOptions::new().levels(257)).is_err());
}
