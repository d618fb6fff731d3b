//! Error types for the snaplz codec.

use thiserror::Error;

/// Main error type for decode operations.
///
/// Compression never fails; every variant here describes a way a
/// compressed buffer (or the sink it is decoded into) can be rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnapError {
    /// The compressed input ends in the middle of the length header or
    /// in the middle of an opcode.
    #[error("compressed input is truncated")]
    Truncated,

    /// The length header uses more bytes than a 32-bit varint allows, or
    /// its final byte would shift bits out of a 32-bit value.
    #[error("length header overflows 32 bits")]
    Overflow,

    /// A copy opcode referenced data outside the bytes produced so far.
    /// Offset zero and offsets pointing before the start of the output
    /// are both corruption.
    #[error("copy offset {offset} is invalid with {produced} bytes produced")]
    InvalidOffset {
        /// The offset the copy opcode decoded to.
        offset: u64,
        /// Bytes of output produced before the offending opcode.
        produced: u64,
    },

    /// The opcode stream does not decode to exactly the byte count the
    /// header declared.
    #[error("stream declared {expected} bytes but decoding produced {actual}")]
    LengthMismatch {
        /// Length declared by the varint header.
        expected: u64,
        /// Bytes actually produced (or that would have been produced).
        actual: u64,
    },

    /// The output target cannot hold the declared uncompressed length.
    #[error("sink needs {needed} more bytes but only {available} remain")]
    SinkTooSmall {
        /// Bytes the decoder still has to write.
        needed: u64,
        /// Bytes of capacity left in the sink.
        available: u64,
    },
}

/// Result type alias for snaplz operations.
pub type Result<T> = std::result::Result<T, SnapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapError::InvalidOffset {
            offset: 0,
            produced: 12,
        };
        assert_eq!(
            err.to_string(),
            "copy offset 0 is invalid with 12 bytes produced"
        );
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = SnapError::LengthMismatch {
            expected: 100,
            actual: 99,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("99"));
    }
}
