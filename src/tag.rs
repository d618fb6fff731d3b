//! Tag-byte decoding and the derived opcode lookup table.
//!
//! Every opcode starts with a tag byte whose low 2 bits select the kind:
//!
//! - `00` literal: high 6 bits hold `len - 1` for lengths up to 60, or
//!   `59 + k` meaning "`k` little-endian bytes after the tag hold
//!   `len - 1`", for `k` in 1..=4.
//! - `01` copy, 1-byte offset: 3 bits of `len - 4` (lengths 4..=11) and
//!   the top 3 bits of an 11-bit offset packed into the tag; the next
//!   byte holds the low 8 offset bits.
//! - `10` copy, 2-byte offset: 6 bits of `len - 1` (lengths 1..=64); the
//!   next two bytes hold the offset little-endian.
//! - `11` copy, 4-byte offset: as above with four offset bytes.
//!
//! Rather than branching on all of this in the decode loop, each of the
//! 256 tag values maps to a 16-bit entry packing the trailing byte count,
//! the base length, and the inline offset bits. The table is derived by
//! rule at first use; the derivation is re-run and checked for
//! exactly-once slot coverage in tests.

use once_cell::sync::Lazy;

/// Low-2-bit tag value for literal opcodes.
pub const LITERAL: u8 = 0;
/// Low-2-bit tag value for copies with a 1-byte offset trailer.
pub const COPY_1_BYTE_OFFSET: u8 = 1;
/// Low-2-bit tag value for copies with a 2-byte offset trailer.
pub const COPY_2_BYTE_OFFSET: u8 = 2;
/// Low-2-bit tag value for copies with a 4-byte offset trailer.
pub const COPY_4_BYTE_OFFSET: u8 = 3;

/// Opcode kind selected by the low 2 bits of a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Raw bytes copied verbatim from the compressed stream.
    Literal,
    /// Back-reference with a 1-byte offset trailer.
    Copy1,
    /// Back-reference with a 2-byte offset trailer.
    Copy2,
    /// Back-reference with a 4-byte offset trailer.
    Copy4,
}

impl TagKind {
    /// Classify a tag byte by its low 2 bits.
    #[inline]
    pub fn from_tag(tag: u8) -> Self {
        match tag & 0b11 {
            0 => TagKind::Literal,
            1 => TagKind::Copy1,
            2 => TagKind::Copy2,
            _ => TagKind::Copy4,
        }
    }
}

/// Pack a table entry: base length in bits 0..8, inline offset high bits
/// in bits 8..11, trailing byte count in bits 11..14.
#[inline]
fn make_entry(extra_bytes: u16, base_len: u16, offset_high: u16) -> u16 {
    debug_assert_eq!(extra_bytes, extra_bytes & 0x7);
    debug_assert_eq!(offset_high, offset_high & 0x7);
    debug_assert_eq!(base_len, base_len & 0x7f);
    base_len | (offset_high << 8) | (extra_bytes << 11)
}

/// Derive the full 256-entry decode table from the opcode rules.
///
/// Each tag value is assigned exactly once; the completeness test
/// re-derives the table with a write counter per slot.
pub fn build_tag_table() -> [u16; 256] {
    let mut table = [0u16; 256];

    // Literals with the length in the tag byte.
    for len in 1u16..=60 {
        table[(LITERAL as usize) | (((len - 1) as usize) << 2)] = make_entry(0, len, 0);
    }
    // Literals with 1..=4 trailing length bytes encoding len - 1.
    for extra_bytes in 1u16..=4 {
        table[(LITERAL as usize) | (((extra_bytes + 59) as usize) << 2)] =
            make_entry(extra_bytes, 1, 0);
    }
    // 1-byte-offset copies: len - 4 in 3 bits, offset bits 8..11 in 3 bits.
    for len in 4u16..12 {
        for offset_high in 0u16..8 {
            table[(COPY_1_BYTE_OFFSET as usize)
                | (((len - 4) as usize) << 2)
                | ((offset_high as usize) << 5)] = make_entry(1, len, offset_high);
        }
    }
    // 2- and 4-byte-offset copies: len - 1 in 6 bits.
    for len in 1u16..=64 {
        table[(COPY_2_BYTE_OFFSET as usize) | (((len - 1) as usize) << 2)] =
            make_entry(2, len, 0);
        table[(COPY_4_BYTE_OFFSET as usize) | (((len - 1) as usize) << 2)] =
            make_entry(4, len, 0);
    }

    table
}

/// The deployed decode table, derived once at first use.
pub static TAG_TABLE: Lazy<[u16; 256]> = Lazy::new(build_tag_table);

/// Number of bytes following the tag that complete the opcode head.
#[inline]
pub fn entry_extra_bytes(entry: u16) -> usize {
    ((entry >> 11) & 0x7) as usize
}

/// Base length stored in the entry. For copies this is the full copy
/// length; for literals it is the literal length when no trailing length
/// bytes follow.
#[inline]
pub fn entry_base_length(entry: u16) -> u64 {
    (entry & 0xff) as u64
}

/// Inline offset bits, already shifted into position above the trailer's
/// low byte. Zero for every kind except 1-byte-offset copies.
#[inline]
pub fn entry_offset_high(entry: u16) -> u64 {
    (entry & 0x700) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_tag_exactly_once() {
        // Re-run the derivation with per-slot write counting.
        let mut writes = [0u32; 256];

        for len in 1usize..=60 {
            writes[(LITERAL as usize) | ((len - 1) << 2)] += 1;
        }
        for extra_bytes in 1usize..=4 {
            writes[(LITERAL as usize) | ((extra_bytes + 59) << 2)] += 1;
        }
        for len in 4usize..12 {
            for offset_high in 0usize..8 {
                writes[(COPY_1_BYTE_OFFSET as usize) | ((len - 4) << 2) | (offset_high << 5)] += 1;
            }
        }
        for len in 1usize..=64 {
            writes[(COPY_2_BYTE_OFFSET as usize) | ((len - 1) << 2)] += 1;
            writes[(COPY_4_BYTE_OFFSET as usize) | ((len - 1) << 2)] += 1;
        }

        for (tag, &count) in writes.iter().enumerate() {
            assert_eq!(count, 1, "tag {tag:#04x} assigned {count} times");
        }
    }

    #[test]
    fn test_deployed_table_matches_derivation() {
        let derived = build_tag_table();
        for (tag, (&deployed, &fresh)) in TAG_TABLE.iter().zip(derived.iter()).enumerate() {
            assert_eq!(deployed, fresh, "mismatch at tag {tag:#04x}");
        }
    }

    #[test]
    fn test_known_entries() {
        // Literal of length 1: tag 0x00.
        let e = TAG_TABLE[0x00];
        assert_eq!(entry_extra_bytes(e), 0);
        assert_eq!(entry_base_length(e), 1);
        assert_eq!(entry_offset_high(e), 0);

        // Literal of length 60: tag (59 << 2).
        let e = TAG_TABLE[59 << 2];
        assert_eq!(entry_extra_bytes(e), 0);
        assert_eq!(entry_base_length(e), 60);

        // Literal with 4 trailing length bytes: tag (63 << 2).
        let e = TAG_TABLE[63 << 2];
        assert_eq!(entry_extra_bytes(e), 4);
        assert_eq!(entry_base_length(e), 1);

        // Copy1 len 4, offset_high 7.
        let e = TAG_TABLE[(COPY_1_BYTE_OFFSET as usize) | (7 << 5)];
        assert_eq!(entry_extra_bytes(e), 1);
        assert_eq!(entry_base_length(e), 4);
        assert_eq!(entry_offset_high(e), 7 << 8);

        // Copy2 len 64: tag 2 | (63 << 2) == 0xfe.
        let e = TAG_TABLE[0xfe];
        assert_eq!(entry_extra_bytes(e), 2);
        assert_eq!(entry_base_length(e), 64);

        // Copy4 len 1: tag 0x03.
        let e = TAG_TABLE[0x03];
        assert_eq!(entry_extra_bytes(e), 4);
        assert_eq!(entry_base_length(e), 1);
    }

    #[test]
    fn test_tag_kind_from_low_bits() {
        assert_eq!(TagKind::from_tag(0x00), TagKind::Literal);
        assert_eq!(TagKind::from_tag(0xfc), TagKind::Literal);
        assert_eq!(TagKind::from_tag(0x01), TagKind::Copy1);
        assert_eq!(TagKind::from_tag(0xfe), TagKind::Copy2);
        assert_eq!(TagKind::from_tag(0xff), TagKind::Copy4);
    }
}
