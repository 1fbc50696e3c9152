//! Codec options and configuration.

use chromapack_codec::{ColorSpace, SubsamplingScheme};
use chromapack_core::{ColorRange, Error, Result};
use serde::{Deserialize, Serialize};

/// High-level codec options using the builder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Color primaries selecting the luma weights.
    pub color_space: ColorSpace,
    /// Narrow or full sample range.
    pub range: ColorRange,
    /// Bit depth of the digital RGB and YCbCr samples.
    pub bit_depth: u8,
    /// Chroma subsampling scheme.
    pub scheme: SubsamplingScheme,
    /// Number of quantizer levels each plane is reduced to.
    pub levels: u64,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Bt601,
            range: ColorRange::Narrow,
            bit_depth: 8,
            scheme: SubsamplingScheme::S420,
            levels: 32,
        }
    }
}

impl CodecOptions {
    /// Create options with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color primaries.
    #[must_use]
    pub fn color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Set the sample range.
    #[must_use]
    pub fn range(mut self, range: ColorRange) -> Self {
        self.range = range;
        self
    }

    /// Set the sample bit depth.
    #[must_use]
    pub fn bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Set the chroma subsampling scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: SubsamplingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the number of quantizer levels.
    #[must_use]
    pub fn levels(mut self, levels: u64) -> Self {
        self.levels = levels;
        self
    }

    /// Validate the options.
    ///
    /// Bit depths are limited to 8..=16 so samples fit the pipeline's
    /// 16-bit intermediate planes; level counts are limited to 2..=256 so
    /// level indices fit a byte-wide symbol alphabet.
    pub fn validate(&self) -> Result<()> {
        if !(8..=16).contains(&self.bit_depth) {
            return Err(Error::validation(format!(
                "bit depth {} is outside the supported 8..=16",
                self.bit_depth
            )));
        }
        if !(2..=256).contains(&self.levels) {
            return Err(Error::validation(format!(
                "level count {} is outside the supported 2..=256",
                self.levels
            )));
        }
        Ok(())
    }

    /// The highest code value at the configured bit depth.
    pub fn max_code(&self) -> u64 {
        (1u64 << self.bit_depth) - 1
    }
}
