//! # Chromapack
//!
//! A memory-safe still-image color codec library written in Rust.
//!
//! This crate provides a high-level API for the full codec pipeline:
//! - Color model transforms: digital RGB to YCbCr and back, BT.601/BT.709
//! - Chroma subsampling: 4:4:4, 4:2:2 and 4:2:0
//! - Uniform level quantization of sample planes
//! - Deterministic Huffman entropy coding
//! - A self-describing bundle container for the coded planes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chromapack::{CodecOptions, Decoder, Encoder, RgbFrame};
//!
//! fn main() -> chromapack::Result<()> {
//!     let options = CodecOptions::new().levels(64);
//!
//!     let pixels = vec![[128u16, 64, 32]; 16 * 16];
//!     let frame = RgbFrame::new(16, 16, pixels)?;
//!
//!     let bundle = Encoder::new(options)?.encode(&[frame])?;
//!     let frames = Decoder::new(options)?.decode(&bundle)?;
//!     assert_eq!(frames.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several crates:
//! - `chromapack-core`: Core types, errors and the bit-level I/O
//! - `chromapack-codec`: The codec stages as pure transforms
//!
//! This crate re-exports the most commonly used types and provides the
//! high-level encoder and decoder.

mod options;
mod pipeline;

// Re-export core types
pub use chromapack_core::{
    BitReader, BitWriter, BitstreamError, CodingError, ColorRange, Error, Frame, Plane, Result,
    Sample, SampleWidth,
};

// Re-export codec types
pub use chromapack_codec::{
    Bundle, Codebook, ColorModel, ColorSpace, HuffmanTree, SubsamplingScheme,
};

// High-level API
pub use options::CodecOptions;
pub use pipeline::{Decoder, Encoder, RgbFrame};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string.
pub fn version() -> &'static str {
    VERSION
}
