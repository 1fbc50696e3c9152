//! # Chromapack Codec
//!
//! The codec stages of chromapack: color model transforms, chroma
//! subsampling, uniform level quantization, Huffman entropy coding and the
//! self-describing bundle container.
//!
//! Each stage is a pure transform over sample buffers; nothing here holds
//! mutable state between calls.

pub mod bundle;
pub mod color;
pub mod huffman;
pub mod quant;
pub mod sampler;

pub use bundle::{Bundle, EncodedPlane, PlaneMeta, BUNDLE_MAGIC, BUNDLE_VERSION};
pub use color::{ypbpr_matrix, ColorModel, ColorSpace, Mat3};
pub use huffman::{Codebook, HuffmanTree};
pub use quant::{quantize_evenly, quantize_plane_evenly};
pub use sampler::{subsample, upsample, SubsamplingScheme};
