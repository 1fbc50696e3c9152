//! Encode and decode pipelines.
//!
//! The encoder walks each frame through digital RGB -> analog RGB ->
//! analog YPbPr -> digital YCbCr -> subsampled planes -> quantizer level
//! indices, then entropy-codes every plane against one shared codebook and
//! packs the result into a bundle. The decoder runs the same stages in
//! reverse.
//!
//! Frequency tallying is a serial first pass over all planes of all
//! frames; the per-plane entropy coding passes run in parallel over the
//! finalized, read-only codebook.

use crate::options::CodecOptions;
use chromapack_codec::{
    quantize_plane_evenly, subsample, upsample, Bundle, ColorModel, EncodedPlane, HuffmanTree,
};
use chromapack_core::{
    packed_from_planes, planes_from_packed, BitReader, BitWriter, CodingError, Error, Frame,
    Plane, Result,
};
use rayon::prelude::*;
use tracing::debug;

/// A digital RGB image at the codec's configured bit depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    width: u32,
    height: u32,
    pixels: Vec<[u16; 3]>,
}

impl RgbFrame {
    /// Create a frame from row-major packed RGB code values.
    pub fn new(width: u32, height: u32, pixels: Vec<[u16; 3]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::validation(format!(
                "frame pixel count {} does not match {}x{} = {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the packed pixel data.
    pub fn pixels(&self) -> &[[u16; 3]] {
        &self.pixels
    }
}

/// Encodes RGB frames into chromapack bundles.
#[derive(Debug, Clone)]
pub struct Encoder {
    options: CodecOptions,
    model: ColorModel,
}

impl Encoder {
    /// Create an encoder after validating the options.
    pub fn new(options: CodecOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            model: ColorModel::new(options.range),
        })
    }

    /// The encoder's options.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Encode frames into a single bundle.
    ///
    /// All planes of all frames share one frequency corpus and one
    /// codebook; per-plane metadata keeps the frames separable on decode.
    pub fn encode(&self, frames: &[RgbFrame]) -> Result<Vec<u8>> {
        if frames.is_empty() {
            return Err(Error::validation("cannot encode an empty frame list"));
        }

        let mut level_planes = Vec::with_capacity(frames.len() * 3);
        for frame in frames {
            let (y, cb, cr) = self.frame_to_ycbcr(frame)?.into_planes();
            let cb = subsample(self.options.scheme, &cb)?;
            let cr = subsample(self.options.scheme, &cr)?;
            for plane in [&y, &cb, &cr] {
                level_planes.push(self.quantize_levels(plane)?);
            }
        }
        debug!(
            frames = frames.len(),
            planes = level_planes.len(),
            scheme = %self.options.scheme,
            "reduced frames to level planes"
        );

        // first pass: one corpus over every plane of every frame
        let mut tally = [0u64; 256];
        for plane in &level_planes {
            for &symbol in plane.as_slice() {
                tally[symbol as usize] += 1;
            }
        }
        let entries: Vec<(u64, u8)> = tally
            .iter()
            .enumerate()
            .filter(|&(_, &frequency)| frequency > 0)
            .map(|(symbol, &frequency)| (frequency, symbol as u8))
            .collect();

        let tree = HuffmanTree::from_frequencies(&entries)?;
        let frequencies: Vec<(u8, u64)> = entries
            .iter()
            .map(|&(frequency, symbol)| (symbol, frequency))
            .collect();

        // the decoder only sees the frequency table, so rebuilding from it
        // must reproduce this exact tree
        let rebuilt = HuffmanTree::from_frequencies(&entries)?;
        if !tree.structurally_eq(&rebuilt) {
            return Err(CodingError::TreeMismatch.into());
        }

        let codebook = tree.codebook();
        debug!(
            symbols = codebook.len(),
            total_frequency = tree.total_frequency(),
            "built shared codebook"
        );

        // second pass: encode planes in parallel over the read-only codebook
        let encoded: Vec<EncodedPlane> = level_planes
            .par_iter()
            .map(|plane| -> Result<EncodedPlane> {
                let mut writer = BitWriter::new();
                for &symbol in plane.as_slice() {
                    codebook.encode(symbol, &mut writer)?;
                }
                let bit_length = writer.position() as u64;
                Ok(EncodedPlane {
                    bits: writer.into_data(),
                    bit_length,
                    shape: plane.shape(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Bundle::pack(&encoded, &frequencies)
    }

    fn frame_to_ycbcr(&self, frame: &RgbFrame) -> Result<Frame<u16>> {
        let depth = self.options.bit_depth;
        let (kr, kb) = self.options.color_space.kr_kb();

        let digital: Vec<[u64; 3]> = frame
            .pixels()
            .iter()
            .map(|px| [u64::from(px[0]), u64::from(px[1]), u64::from(px[2])])
            .collect();
        let analog = self.model.dequantize_rgb(&digital, depth)?;
        let ypbpr = self.model.ypbpr_from_rgb(&analog, kr, kb)?;
        let ycbcr = self.model.quantize_ypbpr(&ypbpr, [depth, depth, depth])?;

        let packed: Vec<[u16; 3]> = ycbcr
            .iter()
            .map(|px| [px[0] as u16, px[1] as u16, px[2] as u16])
            .collect();
        let (y, cb, cr) = planes_from_packed(&packed, frame.width(), frame.height())?;
        Frame::new(y, cb, cr)
    }

    fn quantize_levels(&self, plane: &Plane<u16>) -> Result<Plane<u8>> {
        quantize_plane_evenly(
            plane,
            self.options.levels,
            (0, self.options.max_code()),
            (0, self.options.levels - 1),
        )
    }
}

/// Decodes chromapack bundles back into RGB frames.
#[derive(Debug, Clone)]
pub struct Decoder {
    options: CodecOptions,
    model: ColorModel,
}

impl Decoder {
    /// Create a decoder after validating the options.
    pub fn new(options: CodecOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            model: ColorModel::new(options.range),
        })
    }

    /// The decoder's options.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decode a bundle into the frames it was encoded from.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<RgbFrame>> {
        let bundle = Bundle::unpack(bytes)?;
        let metas = bundle.plane_meta();
        if metas.is_empty() || metas.len() % 3 != 0 {
            return Err(Error::invalid_bundle(format!(
                "plane count {} is not a positive multiple of three",
                metas.len()
            )));
        }

        let tree = bundle.rebuild_tree()?;
        let payload = bundle.payload();

        let mut offsets = Vec::with_capacity(metas.len());
        let mut acc = 0u64;
        for meta in metas {
            offsets.push(acc);
            acc += meta.bit_length;
        }

        let level_planes: Vec<Plane<u8>> = metas
            .par_iter()
            .zip(offsets.par_iter())
            .map(|(meta, &offset)| -> Result<Plane<u8>> {
                let mut reader = BitReader::new(payload);
                reader.skip(offset as usize)?;
                let count = meta.height as usize * meta.width as usize;
                let mut data = Vec::with_capacity(count);
                for _ in 0..count {
                    data.push(tree.decode(&mut reader)?);
                }
                let consumed = reader.position() as u64 - offset;
                if consumed != meta.bit_length {
                    return Err(Error::invalid_bundle(format!(
                        "plane consumed {consumed} bits but the header records {}",
                        meta.bit_length
                    )));
                }
                Plane::new(meta.width, meta.height, data)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(planes = level_planes.len(), "decoded level planes");

        let mut frames = Vec::with_capacity(level_planes.len() / 3);
        for triple in level_planes.chunks_exact(3) {
            frames.push(self.planes_to_frame(&triple[0], &triple[1], &triple[2])?);
        }
        Ok(frames)
    }

    fn planes_to_frame(
        &self,
        y: &Plane<u8>,
        cb: &Plane<u8>,
        cr: &Plane<u8>,
    ) -> Result<RgbFrame> {
        let depth = self.options.bit_depth;
        let (kr, kb) = self.options.color_space.kr_kb();

        let y: Plane<u16> = self.dequantize_levels(y)?;
        let cb: Plane<u16> = self.dequantize_levels(cb)?;
        let cr: Plane<u16> = self.dequantize_levels(cr)?;

        let luma_shape = y.shape();
        let cb = upsample(self.options.scheme, luma_shape, &cb)?;
        let cr = upsample(self.options.scheme, luma_shape, &cr)?;
        let ycbcr = Frame::new(y, cb, cr)?;

        let packed = packed_from_planes(ycbcr.y(), ycbcr.cb(), ycbcr.cr())?;
        let ycbcr: Vec<[u64; 3]> = packed
            .iter()
            .map(|px| [u64::from(px[0]), u64::from(px[1]), u64::from(px[2])])
            .collect();
        let ypbpr = self.model.dequantize_ycbcr(&ycbcr, [depth, depth, depth])?;
        let analog_rgb = self.model.rgb_from_ypbpr(&ypbpr, kr, kb)?;
        let digital = self.model.quantize_rgb(&analog_rgb, depth)?;

        let pixels: Vec<[u16; 3]> = digital
            .iter()
            .map(|px| [px[0] as u16, px[1] as u16, px[2] as u16])
            .collect();
        let (height, width) = luma_shape;
        RgbFrame::new(width, height, pixels)
    }

    fn dequantize_levels(&self, plane: &Plane<u8>) -> Result<Plane<u16>> {
        quantize_plane_evenly(
            plane,
            self.options.levels,
            (0, self.options.levels - 1),
            (0, self.options.max_code()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromapack_codec::{ColorSpace, SubsamplingScheme};
    use chromapack_core::ColorRange;

    fn lossless_options() -> CodecOptions {
        CodecOptions::new()
            .range(ColorRange::Full)
            .scheme(SubsamplingScheme::S444)
            .levels(256)
    }

    fn gray_frame(width: u32, height: u32) -> RgbFrame {
        let pixels = (0..width as usize * height as usize)
            .map(|i| {
                let v = (i % 256) as u16;
                [v, v, v]
            })
            .collect();
        RgbFrame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_frame_pixel_count_validated() {
        assert!(RgbFrame::new(2, 2, vec![[0u16; 3]; 3]).is_err());
    }

    #[test]
    fn test_encoder_rejects_invalid_options() {
        assert!(Encoder::new(CodecOptions::new().bit_depth(7)).is_err());
        assert!(Decoder::new(CodecOptions::new().levels(1)).is_err());
    }

    #[test]
    fn test_encoder_rejects_empty_input() {
        let encoder = Encoder::new(CodecOptions::default()).unwrap();
        assert!(encoder.encode(&[]).is_err());
    }

    #[test]
    fn test_gray_frame_roundtrips_exactly() {
        // gray input has zero chroma, and 256 levels at depth 8 make the
        // level quantizer the identity
        let options = lossless_options();
        let encoder = Encoder::new(options).unwrap();
        let decoder = Decoder::new(options).unwrap();

        let frame = gray_frame(16, 8);
        let bytes = encoder.encode(std::slice::from_ref(&frame)).unwrap();
        let decoded = decoder.decode(&bytes).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0], frame);
    }

    #[test]
    fn test_color_roundtrip_stays_close() {
        let options = lossless_options().color_space(ColorSpace::Bt709);
        let encoder = Encoder::new(options).unwrap();
        let decoder = Decoder::new(options).unwrap();

        let pixels: Vec<[u16; 3]> = (0..64)
            .map(|i| {
                let v = (i * 4) as u16;
                [v, 255 - v, (v * 2) % 256]
            })
            .collect();
        let frame = RgbFrame::new(8, 8, pixels).unwrap();
        let bytes = encoder.encode(std::slice::from_ref(&frame)).unwrap();
        let decoded = decoder.decode(&bytes).unwrap();

        for (orig, rec) in frame.pixels().iter().zip(decoded[0].pixels()) {
            for (a, b) in orig.iter().zip(rec.iter()) {
                assert!(a.abs_diff(*b) <= 3, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_multi_frame_bundle_keeps_frames_separable() {
        let options = lossless_options();
        let encoder = Encoder::new(options).unwrap();
        let decoder = Decoder::new(options).unwrap();

        let frames = vec![gray_frame(8, 4), gray_frame(6, 6)];
        let bytes = encoder.encode(&frames).unwrap();
        let decoded = decoder.decode(&bytes).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].width(), 8);
        assert_eq!(decoded[0].height(), 4);
        assert_eq!(decoded[1].width(), 6);
        assert_eq!(decoded[1].height(), 6);
    }

    #[test]
    fn test_subsampled_roundtrip_restores_shape() {
        let options = CodecOptions::new()
            .range(ColorRange::Full)
            .scheme(SubsamplingScheme::S420)
            .levels(64);
        let encoder = Encoder::new(options).unwrap();
        let decoder = Decoder::new(options).unwrap();

        let frame = gray_frame(10, 6);
        let bytes = encoder.encode(std::slice::from_ref(&frame)).unwrap();
        let decoded = decoder.decode(&bytes).unwrap();

        assert_eq!(decoded[0].width(), 10);
        assert_eq!(decoded[0].height(), 6);
    }

    #[test]
    fn test_decode_rejects_non_triple_plane_count() {
        // a bundle with a single plane cannot be a frame sequence
        let entries = [(4u64, 0u8)];
        let tree = HuffmanTree::from_frequencies(&entries).unwrap();
        let codebook = tree.codebook();
        let mut writer = BitWriter::new();
        for _ in 0..4 {
            codebook.encode(0u8, &mut writer).unwrap();
        }
        let bit_length = writer.position() as u64;
        let plane = EncodedPlane {
            bits: writer.into_data(),
            bit_length,
            shape: (2, 2),
        };
        let bytes = Bundle::pack(&[plane], &[(0, 4)]).unwrap();

        let decoder = Decoder::new(CodecOptions::default()).unwrap();
        let err = decoder.decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidBundle(_)));
    }
}
