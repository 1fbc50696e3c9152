//! Chroma subsampling and reconstruction.
//!
//! Decimates chroma planes by the scheme's vertical/horizontal factors,
//! keeping the top-left (co-sited) sample of each block, and reconstructs
//! them by nearest-neighbour replication cropped back to the luma shape.

use chromapack_core::{Error, Plane, Result, Sample};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A J:a:b chroma subsampling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubsamplingScheme {
    /// 4:4:4, no decimation.
    S444,
    /// 4:2:2, halved horizontally.
    S422,
    /// 4:2:0, halved in both directions.
    #[default]
    S420,
}

impl SubsamplingScheme {
    /// Resolve a `J:a:b` triple into a scheme.
    ///
    /// Anything other than 4:4:4, 4:2:2 or 4:2:0 is rejected.
    pub fn from_j_a_b(j: u8, a: u8, b: u8) -> Result<Self> {
        match (j, a, b) {
            (4, 4, 4) => Ok(Self::S444),
            (4, 2, 2) => Ok(Self::S422),
            (4, 2, 0) => Ok(Self::S420),
            _ => Err(Error::UnsupportedScheme { j, a, b }),
        }
    }

    /// The `J:a:b` triple for this scheme.
    pub fn j_a_b(&self) -> (u8, u8, u8) {
        match self {
            Self::S444 => (4, 4, 4),
            Self::S422 => (4, 2, 2),
            Self::S420 => (4, 2, 0),
        }
    }

    /// Decimation factors as `(vertical, horizontal)`.
    pub fn factors(&self) -> (u32, u32) {
        match self {
            Self::S444 => (1, 1),
            Self::S422 => (1, 2),
            Self::S420 => (2, 2),
        }
    }

    /// The chroma shape produced by decimating a plane of `luma_shape`
    /// (height, width). Partial blocks along the edges keep their sample.
    pub fn chroma_shape(&self, luma_shape: (u32, u32)) -> (u32, u32) {
        let (dv, dh) = self.factors();
        (luma_shape.0.div_ceil(dv), luma_shape.1.div_ceil(dh))
    }
}

impl fmt::Display for SubsamplingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (j, a, b) = self.j_a_b();
        write!(f, "{j}:{a}:{b}")
    }
}

/// Decimate a chroma plane by the scheme's factors.
///
/// Keeps every `dv`-th row and `dh`-th column starting from the top-left
/// sample.
pub fn subsample<T: Sample>(scheme: SubsamplingScheme, plane: &Plane<T>) -> Result<Plane<T>> {
    let (dv, dh) = scheme.factors();
    if dv == 1 && dh == 1 {
        return Ok(plane.clone());
    }

    let (height, width) = plane.shape();
    let out_h = height.div_ceil(dv);
    let out_w = width.div_ceil(dh);

    let mut data = Vec::with_capacity(out_h as usize * out_w as usize);
    for (r, row) in plane.rows().enumerate() {
        if r as u32 % dv != 0 {
            continue;
        }
        data.extend(row.iter().step_by(dh as usize).copied());
    }

    Plane::new(out_w, out_h, data)
}

/// Reconstruct a full-size chroma plane by nearest-neighbour replication.
///
/// Each sample is replicated `dv x dh` times and the result is cropped to
/// exactly `luma_shape` (height, width), which absorbs odd luma dimensions.
pub fn upsample<T: Sample>(
    scheme: SubsamplingScheme,
    luma_shape: (u32, u32),
    plane: &Plane<T>,
) -> Result<Plane<T>> {
    let (dv, dh) = scheme.factors();
    let (luma_h, luma_w) = luma_shape;
    let (chroma_h, chroma_w) = plane.shape();

    if u64::from(chroma_h) * u64::from(dv) < u64::from(luma_h)
        || u64::from(chroma_w) * u64::from(dh) < u64::from(luma_w)
    {
        return Err(Error::validation(format!(
            "chroma shape ({chroma_h}, {chroma_w}) cannot cover luma shape \
             ({luma_h}, {luma_w}) at factors ({dv}, {dh})"
        )));
    }

    if dv == 1 && dh == 1 && plane.shape() == luma_shape {
        return Ok(plane.clone());
    }

    let mut data = Vec::with_capacity(luma_h as usize * luma_w as usize);
    for r in 0..luma_h {
        let src_row = r / dv;
        for c in 0..luma_w {
            let src_col = c / dh;
            // In bounds: coverage was checked above.
            data.push(plane.get(src_row, src_col).ok_or_else(|| {
                Error::validation(format!(
                    "chroma sample ({src_row}, {src_col}) missing during upsampling"
                ))
            })?);
        }
    }

    Plane::new(luma_w, luma_h, data)
}
