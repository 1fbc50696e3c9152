//! Error types for the chromapack codec.
//!
//! All precondition violations surface immediately at the violating call;
//! nothing is retried internally. Error messages name the failing stage and
//! the violated invariant.

use thiserror::Error;

/// Main error type for the chromapack codec.
#[derive(Error, Debug)]
pub enum Error {
    /// Input validation failure (bad shape, bit depth below 8, dimension
    /// mismatch).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Subsampling scheme is not one of 4:4:4, 4:2:2 or 4:2:0.
    #[error("Unsupported subsampling scheme {j}:{a}:{b}")]
    UnsupportedScheme { j: u8, a: u8, b: u8 },

    /// Operating mode that is explicitly not implemented.
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    /// Entropy coding errors (encoding/decoding).
    #[error("Coding error: {0}")]
    Coding(#[from] CodingError),

    /// Bit-level I/O errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// Malformed or truncated bundle container.
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entropy coding errors.
#[derive(Error, Debug)]
pub enum CodingError {
    /// A symbol outside the construction corpus was passed to the encoder.
    #[error("Symbol {symbol} is not part of the codebook corpus")]
    UnknownSymbol { symbol: String },

    /// The bitstream ended before the decoder reached a leaf.
    #[error("Bitstream exhausted at bit {bit_position} before reaching a leaf")]
    CorruptBitstream { bit_position: u64 },

    /// A tree rebuilt from persisted frequencies is not structurally equal to
    /// the tree used for encoding. Signals nondeterministic tie-breaking, a
    /// bug, never an expected runtime condition.
    #[error("Rebuilt Huffman tree does not match the encoding tree")]
    TreeMismatch,

    /// Tree construction was attempted with no symbols.
    #[error("Cannot build a Huffman tree from an empty corpus")]
    EmptyCorpus,
}

/// Bit-level I/O errors.
#[derive(Error, Debug)]
pub enum BitstreamError {
    /// Unexpected end of bitstream.
    #[error("Unexpected end of bitstream")]
    UnexpectedEnd,

    /// Generic bitstream error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for BitstreamError {
    fn from(s: String) -> Self {
        BitstreamError::Other(s)
    }
}

impl From<&str> for BitstreamError {
    fn from(s: &str) -> Self {
        BitstreamError::Other(s.to_string())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an unsupported-mode error.
    pub fn unsupported_mode(msg: impl Into<String>) -> Self {
        Error::UnsupportedMode(msg.into())
    }

    /// Create an invalid-bundle error.
    pub fn invalid_bundle(msg: impl Into<String>) -> Self {
        Error::InvalidBundle(msg.into())
    }

    /// Check if this error came from entropy decoding of corrupt data.
    #[must_use]
    pub fn is_corrupt_bitstream(&self) -> bool {
        matches!(self, Error::Coding(CodingError::CorruptBitstream { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("bit depth must be at least 8".into());
        assert_eq!(
            err.to_string(),
            "Validation error: bit depth must be at least 8"
        );
    }

    #[test]
    fn test_scheme_display() {
        let err = Error::UnsupportedScheme { j: 4, a: 1, b: 1 };
        assert_eq!(err.to_string(), "Unsupported subsampling scheme 4:1:1");
    }

    #[test]
    fn test_coding_error_conversion() {
        let coding_err = CodingError::TreeMismatch;
        let err: Error = coding_err.into();
        assert!(matches!(err, Error::Coding(CodingError::TreeMismatch)));
    }

    #[test]
    fn test_is_corrupt_bitstream() {
        let err: Error = CodingError::CorruptBitstream { bit_position: 17 }.into();
        assert!(err.is_corrupt_bitstream());
        assert!(!Error::validation("x").is_corrupt_bitstream());
    }
}
