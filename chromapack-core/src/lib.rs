//! # Chromapack Core
//!
//! Core types and utilities for the chromapack image codec.
//!
//! This crate provides the fundamental building blocks used across all
//! chromapack components:
//! - Error handling types
//! - Bitstream reading/writing utilities
//! - Plane and frame buffer abstractions

pub mod bitstream;
pub mod error;
pub mod frame;

pub use bitstream::{BitReader, BitWriter};
pub use error::{BitstreamError, CodingError, Error, Result};
pub use frame::{
    packed_from_planes, planes_from_packed, ColorRange, Frame, Plane, Sample, SampleWidth,
};
