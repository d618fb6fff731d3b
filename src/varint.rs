//! Varint32 encoding for the uncompressed-length header.
//!
//! Each byte carries 7 bits of the value, least-significant group first,
//! with the high bit set on every byte except the last. A 32-bit value
//! needs at most 5 bytes.

use crate::error::{Result, SnapError};

/// Longest possible encoding of a 32-bit value.
pub const MAX_VARINT32_BYTES: usize = 5;

/// Append the varint encoding of `value` to `dst`.
pub fn append_varint32(dst: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        dst.push((value as u8) | 0x80);
        value >>= 7;
    }
    dst.push(value as u8);
}

/// Decode a varint32 from the front of `src`.
///
/// Returns the value and the number of bytes consumed. Fails with
/// [`SnapError::Truncated`] if the buffer ends before a terminating byte
/// (high bit clear), and [`SnapError::Overflow`] if the encoding needs
/// more than 5 bytes or the fifth byte carries bits that do not fit in
/// 32 bits.
pub fn decode_varint32(src: &[u8]) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut shift: u32 = 0;
    for (i, &byte) in src.iter().enumerate() {
        if i >= MAX_VARINT32_BYTES {
            return Err(SnapError::Overflow);
        }
        let bits = (byte & 0x7f) as u32;
        if shift == 28 && bits > 0x0f {
            return Err(SnapError::Overflow);
        }
        value |= bits << shift;
        if byte < 0x80 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }
    Err(SnapError::Truncated)
}
