//! Tag-driven decompression and validation.
//!
//! A compressed block is a varint32 uncompressed length followed by an
//! opcode stream. One table-driven loop decodes the stream into any
//! [`Sink`]; writing mode and validating mode differ only in the sink
//! they supply, so a buffer accepted by validation decodes identically
//! in writing mode by construction.
//!
//! Every read is an explicit bounds-checked slice access and every write
//! goes through the sink's capacity accounting: no input, however
//! crafted, can make the loop touch memory outside the caller's buffers.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, SnapError};
use crate::sink::{NullSink, SegmentSink, Sink, VecSink};
use crate::tag::{entry_base_length, entry_extra_bytes, entry_offset_high, TagKind, TAG_TABLE};
use crate::varint::decode_varint32;

/// Read the uncompressed length a block declares, without decoding the
/// body. O(1) in the payload size.
pub fn get_uncompressed_length(compressed: &[u8]) -> Result<u32> {
    decode_varint32(compressed).map(|(length, _)| length)
}

/// Decompress a block into a freshly allocated buffer.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let (expected, header_len) = decode_varint32(compressed)?;
    let body = &compressed[header_len..];
    // Never trust the header for the allocation: a five-byte stream can
    // claim gigabytes. A copy opcode of 3 bytes emits at most 64 bytes,
    // so the body bounds what can actually be produced.
    let plausible = (expected as u64).min(body.len() as u64 * 22) as usize;
    let mut sink = VecSink::with_capacity(plausible);
    decode_body(body, expected as u64, &mut sink)?;
    Ok(sink.into_inner())
}

/// Decompress a block into the supplied sink.
pub fn decompress_into<S: Sink>(compressed: &[u8], sink: &mut S) -> Result<()> {
    let (expected, header_len) = decode_varint32(compressed)?;
    decode_body(&compressed[header_len..], expected as u64, sink)
}

/// Decompress a block into an ordered sequence of output segments.
///
/// The segments must hold at least the declared uncompressed length
/// between them; trailing unused capacity is left untouched.
pub fn decompress_to_segments(compressed: &[u8], segments: &mut [&mut [u8]]) -> Result<()> {
    let mut sink = SegmentSink::new(segments);
    decompress_into(compressed, &mut sink)
}

/// Run the full validating-mode decode without materializing output.
///
/// Accepts a buffer exactly when [`decompress`] would succeed on it.
pub fn is_valid_compressed_buffer(compressed: &[u8]) -> bool {
    let mut sink = NullSink::new();
    decompress_into(compressed, &mut sink).is_ok()
}

/// The shared opcode-stream state machine.
fn decode_body<S: Sink>(body: &[u8], expected: u64, sink: &mut S) -> Result<()> {
    if let Some(available) = sink.remaining() {
        if available < expected {
            return Err(SnapError::SinkTooSmall {
                needed: expected,
                available,
            });
        }
    }

    let mut pos = 0;
    let mut produced: u64 = 0;
    while pos < body.len() {
        let tag = body[pos];
        let entry = TAG_TABLE[tag as usize];
        let extra = entry_extra_bytes(entry);
        if body.len() - (pos + 1) < extra {
            return Err(SnapError::Truncated);
        }
        let trailer = read_trailer(&body[pos + 1..pos + 1 + extra]);
        pos += 1 + extra;

        match TagKind::from_tag(tag) {
            TagKind::Literal => {
                let length = if extra == 0 {
                    entry_base_length(entry)
                } else {
                    trailer + 1
                };
                if length > (body.len() - pos) as u64 {
                    return Err(SnapError::Truncated);
                }
                if length > expected - produced {
                    return Err(SnapError::LengthMismatch {
                        expected,
                        actual: produced + length,
                    });
                }
                let length = length as usize;
                sink.append(&body[pos..pos + length])?;
                pos += length;
                produced += length as u64;
            }
            TagKind::Copy1 | TagKind::Copy2 | TagKind::Copy4 => {
                let length = entry_base_length(entry);
                let offset = entry_offset_high(entry) + trailer;
                if offset == 0 || offset > produced {
                    return Err(SnapError::InvalidOffset { offset, produced });
                }
                if length > expected - produced {
                    return Err(SnapError::LengthMismatch {
                        expected,
                        actual: produced + length,
                    });
                }
                sink.append_from_self(offset, length)?;
                produced += length;
            }
        }
    }

    if produced != expected {
        return Err(SnapError::LengthMismatch {
            expected,
            actual: produced,
        });
    }
    Ok(())
}

/// Little-endian read of a 1, 2, 3, or 4 byte opcode trailer.
#[inline]
fn read_trailer(buf: &[u8]) -> u64 {
    match buf.len() {
        0 => 0,
        1 => buf[0] as u64,
        2 => LittleEndian::read_u16(buf) as u64,
        3 => LittleEndian::read_u24(buf) as u64,
        _ => LittleEndian::read_u32(buf) as u64,
    }
}
