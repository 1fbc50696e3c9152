//! Uniform level quantization of integer sample ranges.
//!
//! Maps samples from a source code range onto evenly spaced levels in a
//! target code range. Both range spans are inclusive, so the divisor is
//! `max - min + 1`. All stages floor; the mapping is monotonic
//! non-decreasing. Running the same call with the ranges swapped
//! approximates the inverse.

use chromapack_core::{Error, Plane, Result, Sample};

/// Quantize samples onto `levels` evenly spaced steps.
///
/// Each value is normalized against the inclusive source span, snapped
/// down to one of `levels` steps, and mapped into the inclusive target
/// span. Values outside the source range scale like any other value and
/// saturate at the edges of the unsigned result.
pub fn quantize_evenly(
    values: &[u64],
    levels: u64,
    source_range: (u64, u64),
    target_range: (u64, u64),
) -> Result<Vec<u64>> {
    let params = QuantParams::new(levels, source_range, target_range)?;
    Ok(values.iter().map(|&v| params.apply(v)).collect())
}

/// Quantize every sample of a plane, preserving its shape.
pub fn quantize_plane_evenly<T: Sample, U: Sample>(
    plane: &Plane<T>,
    levels: u64,
    source_range: (u64, u64),
    target_range: (u64, u64),
) -> Result<Plane<U>> {
    let params = QuantParams::new(levels, source_range, target_range)?;
    Ok(plane.map(|v| U::from_u64(params.apply(v.to_u64()))))
}

#[derive(Debug, Clone, Copy)]
struct QuantParams {
    levels: f64,
    source_min: f64,
    source_span: f64,
    target_min: f64,
    target_span: f64,
}

impl QuantParams {
    fn new(levels: u64, source_range: (u64, u64), target_range: (u64, u64)) -> Result<Self> {
        if levels == 0 {
            return Err(Error::validation("quantizer needs at least one level"));
        }
        let (source_min, source_max) = source_range;
        let (target_min, target_max) = target_range;
        if source_max < source_min {
            return Err(Error::validation(format!(
                "source range ({source_min}, {source_max}) is inverted"
            )));
        }
        if target_max < target_min {
            return Err(Error::validation(format!(
                "target range ({target_min}, {target_max}) is inverted"
            )));
        }

        Ok(Self {
            levels: levels as f64,
            source_min: source_min as f64,
            source_span: (source_max - source_min) as f64 + 1.0,
            target_min: target_min as f64,
            target_span: (target_max - target_min) as f64 + 1.0,
        })
    }

    fn apply(&self, v: u64) -> u64 {
        let normalized = (v as f64 - self.source_min) / self.source_span;
        let leveled = (normalized * self.levels).floor() / self.levels;
        // Saturating float-to-int cast clamps below-range inputs at zero.
        (leveled * self.target_span + self.target_min).floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_32_levels_byte_to_level_indices() {
        let values = [0, 7, 8, 10, 15, 16, 254, 255, 56, 57];
        let out = quantize_evenly(&values, 32, (0, 255), (0, 31)).unwrap();
        assert_eq!(out, vec![0, 0, 1, 1, 1, 2, 31, 31, 7, 7]);
        let floored: Vec<u64> = values.iter().map(|v| v / 8).collect();
        assert_eq!(out, floored);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let values: Vec<u64> = (0..=255).collect();
        let out = quantize_evenly(&values, 5, (0, 255), (0, 255)).unwrap();
        for pair in out.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_swapped_ranges_approximate_inverse() {
        let values = [0, 64, 128, 200, 255];
        let down = quantize_evenly(&values, 16, (0, 255), (0, 15)).unwrap();
        let up = quantize_evenly(&down, 16, (0, 15), (0, 255)).unwrap();
        for (orig, rec) in values.iter().zip(&up) {
            assert!(orig.abs_diff(*rec) < 16, "{orig} vs {rec}");
        }
    }

    #[test]
    fn test_no_pre_clamp_above_source_range() {
        let out = quantize_evenly(&[300], 32, (0, 255), (0, 31)).unwrap();
        assert_eq!(out, vec![37]); // scales past the target top like any value
    }

    #[test]
    fn test_zero_levels_rejected() {
        assert!(quantize_evenly(&[0], 0, (0, 255), (0, 31)).is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(quantize_evenly(&[0], 4, (255, 0), (0, 31)).is_err());
        assert!(quantize_evenly(&[0], 4, (0, 255), (31, 0)).is_err());
    }

    #[test]
    fn test_plane_wrapper_preserves_shape() {
        let plane = Plane::new(2, 2, vec![0u16, 255, 128, 64]).unwrap();
        let out: Plane<u8> = quantize_plane_evenly(&plane, 4, (0, 255), (0, 3)).unwrap();
        assert_eq!(out.shape(), (2, 2));
        assert_eq!(out.as_slice(), &[0, 3, 2, 1]);
    }
}
