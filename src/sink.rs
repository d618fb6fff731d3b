//! Write-side byte stream abstraction.
//!
//! The decoder produces output through [`Sink`] so the same tag-stream
//! loop serves a growable buffer, a fixed list of output segments, and
//! the validating mode that materializes nothing. `append_from_self` is
//! the self-referential copy primitive: its source window may include
//! bytes the very same call is writing, which is how run-length patterns
//! expand, so every implementation copies incrementally.

use crate::error::{Result, SnapError};

/// A write-only, possibly-segmented output target.
pub trait Sink {
    /// Bytes produced so far.
    fn written(&self) -> u64;

    /// Remaining capacity, or `None` for sinks that grow on demand.
    fn remaining(&self) -> Option<u64>;

    /// Append raw bytes.
    fn append(&mut self, data: &[u8]) -> Result<()>;

    /// Append `len` bytes read starting `offset` bytes before the current
    /// write position. Callers must have validated
    /// `1 <= offset <= written()`; the source window may overlap the
    /// bytes being written.
    fn append_from_self(&mut self, offset: u64, len: u64) -> Result<()>;
}

// ---------------------------------------------------------------------------
// VecSink
// ---------------------------------------------------------------------------

/// Growable contiguous sink backed by a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct VecSink {
    buf: Vec<u8>,
}

impl VecSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink with `capacity` bytes pre-reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Consume the sink and return the produced bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Sink for VecSink {
    fn written(&self) -> u64 {
        self.buf.len() as u64
    }

    fn remaining(&self) -> Option<u64> {
        None
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn append_from_self(&mut self, offset: u64, len: u64) -> Result<()> {
        let offset = offset as usize;
        let mut remaining = len as usize;
        debug_assert!(offset >= 1 && offset <= self.buf.len());

        let start = self.buf.len() - offset;
        self.buf.reserve(remaining);
        // The readable window grows as the copy proceeds, so a periodic
        // pattern shorter than the copy length expands correctly.
        while remaining > 0 {
            let window = remaining.min(self.buf.len() - start);
            self.buf.extend_from_within(start..start + window);
            remaining -= window;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SegmentSink
// ---------------------------------------------------------------------------

/// Fixed-capacity sink over an ordered sequence of output segments.
///
/// A single append or self-copy may start in one segment and finish in a
/// later one; segments of length zero are allowed anywhere. Writing past
/// the last byte of the last segment fails [`SnapError::SinkTooSmall`]
/// before any byte is written.
pub struct SegmentSink<'a, 'b> {
    segments: &'a mut [&'b mut [u8]],
    seg: usize,
    off: usize,
    written: u64,
    capacity: u64,
}

impl<'a, 'b> SegmentSink<'a, 'b> {
    /// Create a sink over `segments`.
    pub fn new(segments: &'a mut [&'b mut [u8]]) -> Self {
        let capacity = segments.iter().map(|s| s.len() as u64).sum();
        Self {
            segments,
            seg: 0,
            off: 0,
            written: 0,
            capacity,
        }
    }

    /// Map an absolute output position to (segment, offset). `pos` must
    /// be less than `written`.
    fn locate(&self, pos: u64) -> (usize, usize) {
        let mut remaining = pos;
        for (i, seg) in self.segments.iter().enumerate() {
            if remaining < seg.len() as u64 {
                return (i, remaining as usize);
            }
            remaining -= seg.len() as u64;
        }
        unreachable!("position {pos} is past the write cursor");
    }

    /// Write one byte at the cursor. Capacity must have been checked.
    #[inline]
    fn push_byte(&mut self, byte: u8) {
        while self.off == self.segments[self.seg].len() {
            self.seg += 1;
            self.off = 0;
        }
        self.segments[self.seg][self.off] = byte;
        self.off += 1;
        self.written += 1;
    }
}

impl Sink for SegmentSink<'_, '_> {
    fn written(&self) -> u64 {
        self.written
    }

    fn remaining(&self) -> Option<u64> {
        Some(self.capacity - self.written)
    }

    fn append(&mut self, mut data: &[u8]) -> Result<()> {
        let needed = data.len() as u64;
        let available = self.capacity - self.written;
        if needed > available {
            return Err(SnapError::SinkTooSmall { needed, available });
        }
        while !data.is_empty() {
            if self.off == self.segments[self.seg].len() {
                self.seg += 1;
                self.off = 0;
                continue;
            }
            let seg = &mut self.segments[self.seg];
            let n = data.len().min(seg.len() - self.off);
            seg[self.off..self.off + n].copy_from_slice(&data[..n]);
            self.off += n;
            self.written += n as u64;
            data = &data[n..];
        }
        Ok(())
    }

    fn append_from_self(&mut self, offset: u64, len: u64) -> Result<()> {
        let available = self.capacity - self.written;
        if len > available {
            return Err(SnapError::SinkTooSmall {
                needed: len,
                available,
            });
        }
        debug_assert!(offset >= 1 && offset <= self.written);

        // Byte-at-a-time: the read cursor may be in an earlier segment
        // than the write cursor, both may cross segment boundaries mid
        // copy, and the read cursor may consume bytes this same call has
        // just written.
        let (mut src_seg, mut src_off) = self.locate(self.written - offset);
        for _ in 0..len {
            while src_off == self.segments[src_seg].len() {
                src_seg += 1;
                src_off = 0;
            }
            let byte = self.segments[src_seg][src_off];
            src_off += 1;
            self.push_byte(byte);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NullSink
// ---------------------------------------------------------------------------

/// Validating-mode sink: tracks the produced byte count and nothing else.
#[derive(Debug, Default)]
pub struct NullSink {
    produced: u64,
}

impl NullSink {
    /// Create a sink that discards all output.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for NullSink {
    fn written(&self) -> u64 {
        self.produced
    }

    fn remaining(&self) -> Option<u64> {
        None
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.produced += data.len() as u64;
        Ok(())
    }

    fn append_from_self(&mut self, _offset: u64, len: u64) -> Result<()> {
        self.produced += len;
        Ok(())
    }
}
