//! Common-prefix length of two byte regions.
//!
//! This is the compressor's match extender, comparing 8 bytes at a time
//! and falling back to single bytes only for the final partial word. The
//! XOR-and-count-trailing-zero-bytes trick is byte-order independent for
//! equality, so the same code is exact on any platform.

/// Length of the common prefix of `a` and `b`, bounded by the shorter of
/// the two slices, together with a flag equal to `length >= 8`.
///
/// Stops exactly at the first mismatching byte; never reads past either
/// slice. `a` and `b` may be overlapping views of the same buffer.
#[inline]
pub fn find_match_length(a: &[u8], b: &[u8]) -> (usize, bool) {
    let limit = a.len().min(b.len());
    let mut matched = 0;

    while matched + 8 <= limit {
        let x = u64::from_le_bytes(a[matched..matched + 8].try_into().unwrap());
        let y = u64::from_le_bytes(b[matched..matched + 8].try_into().unwrap());
        let diff = x ^ y;
        if diff != 0 {
            matched += (diff.trailing_zeros() >> 3) as usize;
            return (matched, matched >= 8);
        }
        matched += 8;
    }
    while matched < limit && a[matched] == b[matched] {
        matched += 1;
    }

    (matched, matched >= 8)
}
