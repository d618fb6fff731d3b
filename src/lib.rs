//! # snaplz
//!
//! A pure Rust implementation of the Snappy block compression format:
//! an LZ77-family codec tuned for very fast compression and
//! decompression at a modest ratio.
//!
//! ## Features
//!
//! - Bit-exact Snappy block format: varint32 length header followed by a
//!   literal/copy opcode stream
//! - Compression never fails, for empty through multi-fragment inputs
//! - Decompression is safe against arbitrarily corrupted or adversarial
//!   input: every failure is a typed error, never an out-of-bounds access
//! - Validation mode certifies a buffer without materializing output
//! - Vectored I/O: compress from, and decompress into, sequences of
//!   discontiguous segments, with literals and copies crossing segment
//!   boundaries transparently
//!
//! ## Quick Start
//!
//! ```rust
//! let input = b"aaaaaaaabbbbbbbbaaaaaaaabbbbbbbb".to_vec();
//!
//! let block = snaplz::compress(&input);
//! assert!(block.len() <= snaplz::max_compressed_length(input.len()));
//! assert!(snaplz::is_valid_compressed_buffer(&block));
//!
//! let output = snaplz::decompress(&block)?;
//! assert_eq!(output, input);
//! # Ok::<(), snaplz::SnapError>(())
//! ```
//!
//! ## Architecture
//!
//! The engine is written once against two small traits:
//!
//! - [`Source`] — read side: contiguous ([`ByteSource`]) or segmented
//!   ([`SegmentSource`]) input
//! - [`Sink`] — write side: growable ([`VecSink`]), fixed segments
//!   ([`SegmentSink`]), or counting-only ([`NullSink`], which is how
//!   validation mode reuses the writing-mode decode loop)
//!
//! The decoder is table-driven: all 256 tag bytes map to a derived
//! lookup entry ([`tag::TAG_TABLE`]) giving length, trailing byte count,
//! and inline offset bits without branching on opcode kind in the hot
//! path.
//!
//! Calls are synchronous and share no state; independent compressions
//! and decompressions may run concurrently on separate buffers.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod compress;
pub mod decompress;
pub mod error;
pub mod matchlen;
pub mod sink;
pub mod source;
pub mod tag;
pub mod varint;

// Re-export the public operations and types.
pub use compress::{compress, compress_from_segments, max_compressed_length, MAX_BLOCK_SIZE};
pub use decompress::{
    decompress, decompress_into, decompress_to_segments, get_uncompressed_length,
    is_valid_compressed_buffer,
};
pub use error::{Result, SnapError};
pub use matchlen::find_match_length;
pub use sink::{NullSink, SegmentSink, Sink, VecSink};
pub use source::{ByteSource, SegmentSource, Source};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
