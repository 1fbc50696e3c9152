//! Color model transforms between digital and analog representations.
//!
//! Implements the scaled-and-offset quantization of analog RGB and YPbPr
//! samples into unsigned code values, and the 3x3 matrix transform between
//! gamma-corrected RGB and YPbPr. Narrow range follows the studio-swing
//! scaling (219/224 with offsets 16/128 at 8 bits, scaled up by
//! `2^(depth-8)` for deeper samples); full range uses the whole code space.

use chromapack_core::{ColorRange, Error, Result, SampleWidth};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Narrow-range luma scale at 8 bits.
const NARROW_LUMA_SCALE: f64 = 219.0;
/// Narrow-range chroma scale at 8 bits.
const NARROW_CHROMA_SCALE: f64 = 224.0;
/// Narrow-range luma offset at 8 bits.
const NARROW_LUMA_OFFSET: f64 = 16.0;
/// Narrow-range chroma offset at 8 bits.
const NARROW_CHROMA_OFFSET: f64 = 128.0;

/// Color primaries selecting the luma weighting constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// BT.601 (SD).
    #[default]
    Bt601,
    /// BT.709 (HD).
    Bt709,
}

impl ColorSpace {
    /// The `(Kr, Kb)` luma weights for these primaries.
    pub fn kr_kb(&self) -> (f32, f32) {
        match self {
            Self::Bt601 => (0.299, 0.114),
            Self::Bt709 => (0.2126, 0.0722),
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bt601 => write!(f, "BT.601"),
            Self::Bt709 => write!(f, "BT.709"),
        }
    }
}

/// A minimal 3x3 matrix over `f32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    rows: [[f32; 3]; 3],
}

impl Mat3 {
    /// Create a matrix from its rows.
    pub fn new(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Borrow the rows.
    pub fn rows(&self) -> &[[f32; 3]; 3] {
        &self.rows
    }

    /// Multiply a column vector.
    pub fn mul_vec(&self, v: [f32; 3]) -> [f32; 3] {
        let r = &self.rows;
        [
            r[0][0] * v[0] + r[0][1] * v[1] + r[0][2] * v[2],
            r[1][0] * v[0] + r[1][1] * v[1] + r[1][2] * v[2],
            r[2][0] * v[0] + r[2][1] * v[1] + r[2][2] * v[2],
        ]
    }

    /// Invert via the adjugate and determinant.
    ///
    /// Fails with a validation error when the matrix is singular.
    pub fn inverse(&self) -> Result<Mat3> {
        let m = &self.rows;

        let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
        let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
        let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        if det.abs() < 1e-12 {
            return Err(Error::validation(
                "color matrix is singular and cannot be inverted",
            ));
        }
        let inv_det = 1.0 / det;

        let c10 = m[0][2] * m[2][1] - m[0][1] * m[2][2];
        let c11 = m[0][0] * m[2][2] - m[0][2] * m[2][0];
        let c12 = m[0][1] * m[2][0] - m[0][0] * m[2][1];

        let c20 = m[0][1] * m[1][2] - m[0][2] * m[1][1];
        let c21 = m[0][2] * m[1][0] - m[0][0] * m[1][2];
        let c22 = m[0][0] * m[1][1] - m[0][1] * m[1][0];

        Ok(Mat3::new([
            [c00 * inv_det, c10 * inv_det, c20 * inv_det],
            [c01 * inv_det, c11 * inv_det, c21 * inv_det],
            [c02 * inv_det, c12 * inv_det, c22 * inv_det],
        ]))
    }
}

/// The RGB-to-YPbPr transform matrix for the given luma weights.
///
/// `Kg` is derived as `1 - Kr - Kb`. Row one produces luma; rows two and
/// three produce the blue- and red-difference components scaled into
/// `[-0.5, 0.5]`.
pub fn ypbpr_matrix(kr: f32, kb: f32) -> Mat3 {
    let kg = 1.0 - kr - kb;
    let pb_scale = 0.5 / (kb - 1.0);
    let pr_scale = 0.5 / (kr - 1.0);
    Mat3::new([
        [kr, kg, kb],
        [kr * pb_scale, kg * pb_scale, (kb - 1.0) * pb_scale],
        [(kr - 1.0) * pr_scale, kg * pr_scale, kb * pr_scale],
    ])
}

/// Clamp an analog value to `[min, max]`.
pub fn clip_analog(x: f32, min: f32, max: f32) -> f32 {
    x.clamp(min, max)
}

/// Clamp a digital value to the code range of `bit_depth` and narrow it
/// to `u64`.
pub fn clip_digital(x: f64, bit_depth: u8) -> u64 {
    let max = max_code(bit_depth);
    x.clamp(0.0, max as f64) as u64
}

/// The highest code value at a bit depth.
fn max_code(bit_depth: u8) -> u64 {
    if bit_depth >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_depth) - 1
    }
}

/// Per-component scaling parameters at a bit depth.
#[derive(Debug, Clone, Copy)]
struct ComponentScale {
    scale: f64,
    offset: f64,
}

/// Immutable per-call color model parameters.
///
/// Carries the sample range and the transfer assumption; every operation
/// takes the buffers it works on as arguments and returns new buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorModel {
    /// Narrow (studio-swing) or full code range.
    pub range: ColorRange,
    /// Whether samples are gamma-corrected. Linear-light input is not
    /// implemented and every operation rejects it.
    pub gamma_corrected: bool,
}

impl Default for ColorModel {
    fn default() -> Self {
        Self {
            range: ColorRange::Narrow,
            gamma_corrected: true,
        }
    }
}

impl ColorModel {
    /// Create a gamma-corrected model with the given range.
    pub fn new(range: ColorRange) -> Self {
        Self {
            range,
            gamma_corrected: true,
        }
    }

    fn ensure_supported(&self) -> Result<()> {
        if !self.gamma_corrected {
            return Err(Error::unsupported_mode(
                "linear-light (non-gamma-corrected) samples are not implemented",
            ));
        }
        Ok(())
    }

    fn rgb_scale(&self, bit_depth: u8) -> ComponentScale {
        match self.range {
            ColorRange::Full => ComponentScale {
                scale: max_code(bit_depth) as f64,
                offset: 0.0,
            },
            ColorRange::Narrow => {
                let pad = pad_factor(bit_depth);
                ComponentScale {
                    scale: NARROW_LUMA_SCALE * pad,
                    offset: NARROW_LUMA_OFFSET * pad,
                }
            }
        }
    }

    fn luma_scale(&self, bit_depth: u8) -> ComponentScale {
        self.rgb_scale(bit_depth)
    }

    fn chroma_scale(&self, bit_depth: u8) -> ComponentScale {
        match self.range {
            ColorRange::Full => ComponentScale {
                scale: max_code(bit_depth) as f64,
                offset: half_code(bit_depth),
            },
            ColorRange::Narrow => {
                let pad = pad_factor(bit_depth);
                ComponentScale {
                    scale: NARROW_CHROMA_SCALE * pad,
                    offset: NARROW_CHROMA_OFFSET * pad,
                }
            }
        }
    }

    /// Quantize analog RGB triples in `[0,1]` to code values at `bit_depth`.
    ///
    /// Rounds to the nearest code and clamps to the code range. Callers
    /// narrow storage with [`SampleWidth::for_bit_depth`].
    pub fn quantize_rgb(&self, pixels: &[[f32; 3]], bit_depth: u8) -> Result<Vec<[u64; 3]>> {
        self.ensure_supported()?;
        SampleWidth::for_bit_depth(bit_depth)?;

        let cs = self.rgb_scale(bit_depth);
        Ok(pixels
            .iter()
            .map(|px| {
                let mut out = [0u64; 3];
                for (o, &v) in out.iter_mut().zip(px.iter()) {
                    *o = quantize_component(v, cs, bit_depth);
                }
                out
            })
            .collect())
    }

    /// Recover analog RGB in `[0,1]` from code values at `bit_depth`.
    pub fn dequantize_rgb(&self, pixels: &[[u64; 3]], bit_depth: u8) -> Result<Vec<[f32; 3]>> {
        self.ensure_supported()?;
        SampleWidth::for_bit_depth(bit_depth)?;

        let cs = self.rgb_scale(bit_depth);
        Ok(pixels
            .iter()
            .map(|px| {
                let mut out = [0f32; 3];
                for (o, &v) in out.iter_mut().zip(px.iter()) {
                    *o = clip_analog(dequantize_component(v, cs), 0.0, 1.0);
                }
                out
            })
            .collect())
    }

    /// Quantize analog YPbPr triples to digital YCbCr.
    ///
    /// Luma is expected in `[0,1]` and chroma in `[-0.5,0.5]`; each
    /// component may use its own bit depth.
    pub fn quantize_ypbpr(&self, pixels: &[[f32; 3]], depths: [u8; 3]) -> Result<Vec<[u64; 3]>> {
        self.ensure_supported()?;
        for depth in depths {
            SampleWidth::for_bit_depth(depth)?;
        }

        let scales = [
            self.luma_scale(depths[0]),
            self.chroma_scale(depths[1]),
            self.chroma_scale(depths[2]),
        ];
        Ok(pixels
            .iter()
            .map(|px| {
                let mut out = [0u64; 3];
                for i in 0..3 {
                    out[i] = quantize_component(px[i], scales[i], depths[i]);
                }
                out
            })
            .collect())
    }

    /// Recover analog YPbPr from digital YCbCr code values.
    pub fn dequantize_ycbcr(&self, pixels: &[[u64; 3]], depths: [u8; 3]) -> Result<Vec<[f32; 3]>> {
        self.ensure_supported()?;
        for depth in depths {
            SampleWidth::for_bit_depth(depth)?;
        }

        let scales = [
            self.luma_scale(depths[0]),
            self.chroma_scale(depths[1]),
            self.chroma_scale(depths[2]),
        ];
        let bounds = [(0.0, 1.0), (-0.5, 0.5), (-0.5, 0.5)];
        Ok(pixels
            .iter()
            .map(|px| {
                let mut out = [0f32; 3];
                for i in 0..3 {
                    let (lo, hi) = bounds[i];
                    out[i] = clip_analog(dequantize_component(px[i], scales[i]), lo, hi);
                }
                out
            })
            .collect())
    }

    /// Transform analog RGB to analog YPbPr under the given luma weights.
    pub fn ypbpr_from_rgb(&self, pixels: &[[f32; 3]], kr: f32, kb: f32) -> Result<Vec<[f32; 3]>> {
        self.ensure_supported()?;
        let m = ypbpr_matrix(kr, kb);
        Ok(pixels.iter().map(|&px| m.mul_vec(px)).collect())
    }

    /// Transform analog YPbPr back to analog RGB under the given luma
    /// weights. Applies the exact inverse of [`ypbpr_matrix`].
    pub fn rgb_from_ypbpr(&self, pixels: &[[f32; 3]], kr: f32, kb: f32) -> Result<Vec<[f32; 3]>> {
        self.ensure_supported()?;
        let m = ypbpr_matrix(kr, kb).inverse()?;
        Ok(pixels.iter().map(|&px| m.mul_vec(px)).collect())
    }
}

/// The narrow-range scale-up factor from 8 bits to `bit_depth`.
fn pad_factor(bit_depth: u8) -> f64 {
    2f64.powi(i32::from(bit_depth) - 8)
}

/// The mid-range chroma offset `2^(depth-1)`.
fn half_code(bit_depth: u8) -> f64 {
    2f64.powi(i32::from(bit_depth) - 1)
}

fn quantize_component(v: f32, cs: ComponentScale, bit_depth: u8) -> u64 {
    let value = (f64::from(v) * cs.scale + cs.offset).round();
    clip_digital(value, bit_depth)
}

fn dequantize_component(v: u64, cs: ComponentScale) -> f32 {
    ((v as f64 - cs.offset) / cs.scale) as f32
}
