//! Greedy LZ77 compressor producing the block format.
//!
//! Input is split into fragments of at most [`MAX_BLOCK_SIZE`] bytes,
//! each compressed independently against a per-call hash table mapping a
//! hashed 4-byte window to the most recent position that hashed there.
//! Fragments keep copy offsets under 16 bits and bound the working set;
//! the decompressor accepts any offsets the format can describe, so this
//! split is a tuning choice, not a format rule.

use byteorder::{ByteOrder, LittleEndian};

use crate::matchlen::find_match_length;
use crate::source::{ByteSource, SegmentSource, Source};
use crate::tag::{COPY_1_BYTE_OFFSET, COPY_2_BYTE_OFFSET, COPY_4_BYTE_OFFSET, LITERAL};
use crate::varint::append_varint32;

/// Fragment size: inputs longer than this are compressed in independent
/// chunks, each with a fresh hash table.
pub const MAX_BLOCK_SIZE: usize = 1 << 16;

const MIN_HASH_TABLE_SIZE: usize = 16;
const MAX_HASH_TABLE_SIZE: usize = 1 << 14;

/// Positions this close to the fragment end are never used as match
/// starts, so the hot loop can load 4-byte windows without bounds
/// branches on every byte.
const INPUT_MARGIN: usize = 15;

/// Minimum bytes a copy must cover to beat emitting them as a literal.
const MIN_MATCH: usize = 4;

/// Upper bound on `compress(input).len()` for an input of `input_len`
/// bytes. Sizing an output buffer to this bound guarantees compression
/// never needs to grow it mid-call.
pub fn max_compressed_length(input_len: usize) -> usize {
    32 + input_len + input_len / 6
}

/// Compress `input` into a self-describing block.
///
/// Never fails; empty input produces a header-only block.
pub fn compress(input: &[u8]) -> Vec<u8> {
    debug_assert!(input.len() as u64 <= u32::MAX as u64);
    compress_source(&mut ByteSource::new(input), input.len())
}

/// Compress the concatenation of `segments` into a single block.
///
/// Produces the same logical stream as [`compress`] over the joined
/// bytes; fragments that straddle a segment boundary are gathered into a
/// scratch buffer first.
pub fn compress_from_segments(segments: &[&[u8]]) -> Vec<u8> {
    let total = segments.iter().map(|s| s.len()).sum();
    debug_assert!(total as u64 <= u32::MAX as u64);
    compress_source(&mut SegmentSource::new(segments), total)
}

fn compress_source<S: Source>(source: &mut S, total: usize) -> Vec<u8> {
    let mut dst = Vec::with_capacity(max_compressed_length(total));
    append_varint32(&mut dst, total as u32);

    let mut table = HashTable::new();
    let mut scratch: Vec<u8> = Vec::new();
    let mut remaining = total;
    while remaining > 0 {
        let fragment_len = remaining.min(MAX_BLOCK_SIZE);
        table.reset(fragment_len);
        if source.peek().len() >= fragment_len {
            let fragment = &source.peek()[..fragment_len];
            compress_fragment(fragment, &mut table, &mut dst);
            source.skip(fragment_len);
        } else {
            scratch.clear();
            while scratch.len() < fragment_len {
                let run = source.peek();
                let take = run.len().min(fragment_len - scratch.len());
                scratch.extend_from_slice(&run[..take]);
                source.skip(take);
            }
            compress_fragment(&scratch, &mut table, &mut dst);
        }
        remaining -= fragment_len;
    }
    dst
}

// ---------------------------------------------------------------------------
// Hash table
// ---------------------------------------------------------------------------

/// Position arena indexed by a hash of a 4-byte window.
///
/// Slots hold fragment-relative positions, which fit in `u16` because
/// fragments never exceed 64 KiB. The allocation is reused across
/// fragments of one compression call; slots are cleared on reset. A
/// stale zero slot can only ever send the probe to position 0, where the
/// 4-byte verification load rejects false matches.
struct HashTable {
    slots: Vec<u16>,
    shift: u32,
}

impl HashTable {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            shift: 0,
        }
    }

    /// Size the table for the next fragment and clear it.
    fn reset(&mut self, fragment_len: usize) {
        let size = fragment_len
            .next_power_of_two()
            .clamp(MIN_HASH_TABLE_SIZE, MAX_HASH_TABLE_SIZE);
        if self.slots.len() != size {
            self.slots.resize(size, 0);
        }
        self.slots.fill(0);
        self.shift = 32 - size.trailing_zeros();
    }

    #[inline]
    fn index(&self, window: u32) -> usize {
        (window.wrapping_mul(0x1e35_a7bd) >> self.shift) as usize
    }
}

#[inline]
fn load32(input: &[u8], pos: usize) -> u32 {
    LittleEndian::read_u32(&input[pos..pos + 4])
}

// ---------------------------------------------------------------------------
// Fragment compression
// ---------------------------------------------------------------------------

/// One greedy LZ77 pass over a fragment of at most [`MAX_BLOCK_SIZE`]
/// bytes, appending opcodes to `dst`.
fn compress_fragment(input: &[u8], table: &mut HashTable, dst: &mut Vec<u8>) {
    debug_assert!(input.len() <= MAX_BLOCK_SIZE);
    let len = input.len();
    let mut next_emit = 0;

    if len >= INPUT_MARGIN {
        let ip_limit = len - INPUT_MARGIN;
        let mut ip = 1;

        'fragment: loop {
            // Probe for the next match, skipping ahead faster the longer
            // we go without finding one so incompressible data costs
            // little more than a copy.
            let mut skip: u32 = 32;
            let mut candidate: usize;
            loop {
                if ip > ip_limit {
                    break 'fragment;
                }
                let window = load32(input, ip);
                let slot = table.index(window);
                candidate = table.slots[slot] as usize;
                table.slots[slot] = ip as u16;
                if candidate < ip && load32(input, candidate) == window {
                    break;
                }
                ip += (skip >> 5) as usize;
                skip += 1;
            }

            // Extend the match backward into the pending literal run.
            while ip > next_emit && candidate > 0 && input[ip - 1] == input[candidate - 1] {
                ip -= 1;
                candidate -= 1;
            }

            emit_literal(dst, &input[next_emit..ip]);

            loop {
                let (matched, _) = find_match_length(&input[candidate..], &input[ip..]);
                debug_assert!(matched >= MIN_MATCH);
                emit_copy(dst, ip - candidate, matched);
                ip += matched;
                next_emit = ip;
                if ip > ip_limit {
                    break 'fragment;
                }

                // Matches often chain; hash the position straddling the
                // copy end and test for an immediate follow-up before
                // falling back to the probe loop.
                let prev = load32(input, ip - 1);
                let prev_slot = table.index(prev);
                table.slots[prev_slot] = (ip - 1) as u16;
                let window = load32(input, ip);
                let slot = table.index(window);
                candidate = table.slots[slot] as usize;
                table.slots[slot] = ip as u16;
                if candidate >= ip || load32(input, candidate) != window {
                    ip += 1;
                    break;
                }
            }
        }
    }

    if next_emit < len {
        emit_literal(dst, &input[next_emit..]);
    }
}

/// Emit one literal opcode covering all of `lit`.
fn emit_literal(dst: &mut Vec<u8>, lit: &[u8]) {
    if lit.is_empty() {
        return;
    }
    let n = lit.len() - 1;
    if n < 60 {
        dst.push(LITERAL | ((n as u8) << 2));
    } else {
        let mut length_bytes = [0u8; 4];
        let mut count = 0;
        let mut v = n;
        while v > 0 {
            length_bytes[count] = v as u8;
            v >>= 8;
            count += 1;
        }
        dst.push(LITERAL | (((59 + count) as u8) << 2));
        dst.extend_from_slice(&length_bytes[..count]);
    }
    dst.extend_from_slice(lit);
}

/// Emit copy opcodes covering `len` bytes from `offset` back.
///
/// Lengths over 64 are split into 64-byte copies, stepping down to 60
/// before the tail so the final piece is never shorter than 4 and can
/// still use the 1-byte-offset encoding when the offset allows it.
fn emit_copy(dst: &mut Vec<u8>, offset: usize, mut len: usize) {
    debug_assert!(len >= MIN_MATCH);
    while len >= 68 {
        emit_copy_upto_64(dst, offset, 64);
        len -= 64;
    }
    if len > 64 {
        emit_copy_upto_64(dst, offset, 60);
        len -= 60;
    }
    emit_copy_upto_64(dst, offset, len);
}

fn emit_copy_upto_64(dst: &mut Vec<u8>, offset: usize, len: usize) {
    debug_assert!((1..=64).contains(&len));
    if (4..12).contains(&len) && offset < 2048 {
        dst.push(COPY_1_BYTE_OFFSET | (((len - 4) as u8) << 2) | (((offset >> 8) as u8) << 5));
        dst.push(offset as u8);
    } else if offset < 65536 {
        dst.push(COPY_2_BYTE_OFFSET | (((len - 1) as u8) << 2));
        dst.extend_from_slice(&(offset as u16).to_le_bytes());
    } else {
        dst.push(COPY_4_BYTE_OFFSET | (((len - 1) as u8) << 2));
        dst.extend_from_slice(&(offset as u32).to_le_bytes());
    }
}
