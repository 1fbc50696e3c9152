//! Plane and frame buffer abstractions.
//!
//! Provides types for representing still-image sample data as planar
//! buffers. A [`Plane`] is a row-major 2D grid of unsigned samples; a
//! [`Frame`] groups a luma plane with two chroma planes that may be
//! decimated relative to it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color range (narrow/full).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorRange {
    /// Narrow/TV range (16-235 for Y, 16-240 for Cb/Cr at 8 bits).
    #[default]
    Narrow,
    /// Full/PC range (0-255 at 8 bits).
    Full,
}

impl fmt::Display for ColorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrow => write!(f, "narrow"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// An unsigned integer sample type usable as a plane element.
///
/// Implemented for the unsigned widths a codeword can be stored in. All
/// conversions go through `u64`, the widest supported representation.
pub trait Sample:
    Copy + Clone + fmt::Debug + Default + PartialEq + Eq + PartialOrd + Ord + Send + Sync + 'static
{
    /// Width of the type in bits.
    const BITS: u8;

    /// Widen to `u64`.
    fn to_u64(self) -> u64;

    /// Narrow from `u64`. The value must fit; callers validate bit depth
    /// before converting.
    fn from_u64(v: u64) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty => $bits:expr),* $(,)?) => {
        $(
            impl Sample for $ty {
                const BITS: u8 = $bits;

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_u64(v: u64) -> Self {
                    v as $ty
                }
            }
        )*
    };
}

impl_sample!(u8 => 8, u16 => 16, u32 => 32, u64 => 64);

/// The narrowest unsigned storage width for a given bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleWidth {
    /// Up to 8 bits per sample.
    U8,
    /// 9 to 16 bits per sample.
    U16,
    /// 17 to 32 bits per sample.
    U32,
    /// 33 to 64 bits per sample.
    U64,
}

impl SampleWidth {
    /// Select the narrowest width that can hold `bit_depth` bits.
    ///
    /// Bit depths below 8 are rejected; they are not meaningful for any
    /// supported color model.
    pub fn for_bit_depth(bit_depth: u8) -> Result<Self> {
        match bit_depth {
            0..=7 => Err(Error::validation(format!(
                "bit depth {bit_depth} is below the minimum of 8"
            ))),
            8 => Ok(Self::U8),
            9..=16 => Ok(Self::U16),
            17..=32 => Ok(Self::U32),
            33..=64 => Ok(Self::U64),
            _ => Err(Error::validation(format!(
                "bit depth {bit_depth} exceeds the maximum of 64"
            ))),
        }
    }

    /// Width of the storage type in bits.
    pub fn bits(&self) -> u8 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }
}

impl fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
        }
    }
}

/// A row-major 2D grid of samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Sample> Plane<T> {
    /// Create a plane from row-major sample data.
    pub fn new(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::validation(format!(
                "plane data length {} does not match {}x{} = {} samples",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a zero-filled plane.
    pub fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width as usize * height as usize],
        }
    }

    /// Plane width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Shape as `(height, width)`.
    pub fn shape(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the plane holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the sample at `(row, col)`, if in bounds.
    pub fn get(&self, row: u32, col: u32) -> Option<T> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.data[row as usize * self.width as usize + col as usize])
    }

    /// Iterate over rows as sample slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.width.max(1) as usize)
    }

    /// Borrow the row-major sample data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Take the row-major sample data, consuming the plane.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Apply a samplewise transform, producing a plane of the same shape.
    pub fn map<U: Sample>(&self, f: impl Fn(T) -> U) -> Plane<U> {
        Plane {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// A still image as one luma plane and two chroma planes.
///
/// The chroma planes may be smaller than the luma plane when the frame
/// carries subsampled chroma, but never larger in either dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<T> {
    y: Plane<T>,
    cb: Plane<T>,
    cr: Plane<T>,
}

impl<T: Sample> Frame<T> {
    /// Assemble a frame from three planes.
    ///
    /// The two chroma planes must have identical shapes and must not
    /// exceed the luma plane in either dimension.
    pub fn new(y: Plane<T>, cb: Plane<T>, cr: Plane<T>) -> Result<Self> {
        if cb.shape() != cr.shape() {
            return Err(Error::validation(format!(
                "chroma plane shapes differ: Cb {:?} vs Cr {:?}",
                cb.shape(),
                cr.shape()
            )));
        }
        if cb.height > y.height || cb.width > y.width {
            return Err(Error::validation(format!(
                "chroma shape {:?} exceeds luma shape {:?}",
                cb.shape(),
                y.shape()
            )));
        }
        Ok(Self { y, cb, cr })
    }

    /// Frame width (the luma plane's width).
    pub fn width(&self) -> u32 {
        self.y.width
    }

    /// Frame height (the luma plane's height).
    pub fn height(&self) -> u32 {
        self.y.height
    }

    /// The luma plane.
    pub fn y(&self) -> &Plane<T> {
        &self.y
    }

    /// The blue-difference chroma plane.
    pub fn cb(&self) -> &Plane<T> {
        &self.cb
    }

    /// The red-difference chroma plane.
    pub fn cr(&self) -> &Plane<T> {
        &self.cr
    }

    /// Check if the chroma planes match the luma plane's shape.
    pub fn is_fully_sampled(&self) -> bool {
        self.cb.shape() == self.y.shape()
    }

    /// Split into `(y, cb, cr)` planes.
    pub fn into_planes(self) -> (Plane<T>, Plane<T>, Plane<T>) {
        (self.y, self.cb, self.cr)
    }
}

/// Split packed three-component pixels into three planes.
///
/// `pixels` is row-major with `width * height` entries; each entry holds
/// one sample per component in channel order.
pub fn planes_from_packed<T: Sample>(
    pixels: &[[T; 3]],
    width: u32,
    height: u32,
) -> Result<(Plane<T>, Plane<T>, Plane<T>)> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(Error::validation(format!(
            "packed pixel count {} does not match {}x{} = {}",
            pixels.len(),
            width,
            height,
            expected
        )));
    }

    let mut c0 = Vec::with_capacity(expected);
    let mut c1 = Vec::with_capacity(expected);
    let mut c2 = Vec::with_capacity(expected);
    for px in pixels {
        c0.push(px[0]);
        c1.push(px[1]);
        c2.push(px[2]);
    }

    Ok((
        Plane::new(width, height, c0)?,
        Plane::new(width, height, c1)?,
        Plane::new(width, height, c2)?,
    ))
}

/// Interleave three equally shaped planes into packed pixels.
pub fn packed_from_planes<T: Sample>(
    c0: &Plane<T>,
    c1: &Plane<T>,
    c2: &Plane<T>,
) -> Result<Vec<[T; 3]>> {
    if c0.shape() != c1.shape() || c1.shape() != c2.shape() {
        return Err(Error::validation(format!(
            "plane shapes differ: {:?}, {:?}, {:?}",
            c0.shape(),
            c1.shape(),
            c2.shape()
        )));
    }

    Ok(c0
        .as_slice()
        .iter()
        .zip(c1.as_slice())
        .zip(c2.as_slice())
        .map(|((&a, &b), &c)| [a, b, c])
        .collect())
}
