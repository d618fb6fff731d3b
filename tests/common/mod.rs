//! Shared test utilities for snaplz integration tests.
//!
//! Consolidates the verify pipeline (compress, size bound, validate,
//! round-trip, vectored-source and vectored-sink equivalence) and the
//! hand-built opcode stream builders used by the corruption and
//! segmented-I/O suites.

#![allow(dead_code)]

// ===========================================================================
// Full verification pipeline
// ===========================================================================

/// Compress `input` and check every public contract against it.
pub fn verify(input: &[u8]) {
    let block = snaplz::compress(input);
    assert!(
        block.len() <= snaplz::max_compressed_length(input.len()),
        "size bound violated: {} > {}",
        block.len(),
        snaplz::max_compressed_length(input.len())
    );
    assert!(snaplz::is_valid_compressed_buffer(&block));
    assert_eq!(
        snaplz::get_uncompressed_length(&block).unwrap() as usize,
        input.len()
    );

    let output = snaplz::decompress(&block).unwrap();
    assert_eq!(output, input, "round-trip mismatch");

    // Compressing from a segmented source must give the same stream.
    let segments = split_segments(input);
    let segmented_block = snaplz::compress_from_segments(&segments);
    assert_eq!(
        segmented_block, block,
        "segmented source produced a different stream"
    );

    // Decompressing into a segmented sink must give the same bytes.
    let mut storage = segment_storage(input.len());
    let mut out_segments: Vec<&mut [u8]> =
        storage.iter_mut().map(|v| v.as_mut_slice()).collect();
    snaplz::decompress_to_segments(&block, &mut out_segments).unwrap();
    let flat: Vec<u8> = storage.into_iter().flatten().collect();
    assert_eq!(&flat[..input.len()], input, "segmented sink mismatch");
}

/// Deterministically split `input` into segments, including zero-length
/// segments at the start, middle, and end.
pub fn split_segments(input: &[u8]) -> Vec<&[u8]> {
    const SIZES: [usize; 10] = [0, 1, 2, 3, 5, 8, 13, 4096, 0, 65535];
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut i = 0;
    while pos < input.len() {
        let take = SIZES[i % SIZES.len()].min(input.len() - pos);
        segments.push(&input[pos..pos + take]);
        pos += take;
        i += 1;
    }
    segments.push(&input[input.len()..]); // trailing empty segment
    segments
}

/// Allocate output segments totalling at least `len` bytes, with small
/// and zero-length segments up front.
pub fn segment_storage(len: usize) -> Vec<Vec<u8>> {
    const SIZES: [usize; 7] = [2, 0, 1, 4, 8, 128, 4096];
    let mut storage = Vec::new();
    let mut total = 0;
    let mut i = 0;
    while total < len {
        let n = SIZES[i % SIZES.len()];
        storage.push(vec![0u8; n]);
        total += n;
        i += 1;
    }
    if storage.is_empty() {
        storage.push(Vec::new());
    }
    storage
}

// ===========================================================================
// Hand-built opcode streams
// ===========================================================================

/// Append a literal opcode for `literal`, choosing the shortest length
/// encoding. Mirrors the format rules independently of the compressor.
pub fn append_literal(dst: &mut Vec<u8>, literal: &[u8]) {
    if literal.is_empty() {
        return;
    }
    let n = literal.len() - 1;
    if n < 60 {
        dst.push((n as u8) << 2);
    } else {
        let mut bytes = [0u8; 4];
        let mut count = 0;
        let mut v = n;
        while v > 0 {
            bytes[count] = v as u8;
            v >>= 8;
            count += 1;
        }
        dst.push(((59 + count) as u8) << 2);
        dst.extend_from_slice(&bytes[..count]);
    }
    dst.extend_from_slice(literal);
}

/// Append copy opcodes for `length` bytes from `offset` back, splitting
/// long copies the way a conforming encoder does.
pub fn append_copy(dst: &mut Vec<u8>, offset: usize, mut length: usize) {
    while length > 0 {
        let to_copy = if length >= 68 {
            64
        } else if length > 64 {
            60
        } else {
            length
        };
        length -= to_copy;

        if (4..12).contains(&to_copy) && offset < 2048 {
            dst.push(0x01 | (((to_copy - 4) as u8) << 2) | (((offset >> 8) as u8) << 5));
            dst.push(offset as u8);
        } else if offset < 65536 {
            dst.push(0x02 | (((to_copy - 1) as u8) << 2));
            dst.extend_from_slice(&(offset as u16).to_le_bytes());
        } else {
            dst.push(0x03 | (((to_copy - 1) as u8) << 2));
            dst.extend_from_slice(&(offset as u32).to_le_bytes());
        }
    }
}

/// Append the varint32 length header.
pub fn append_header(dst: &mut Vec<u8>, mut length: u32) {
    while length >= 0x80 {
        dst.push((length as u8) | 0x80);
        length >>= 7;
    }
    dst.push(length as u8);
}
