//! Read-side byte stream abstraction.
//!
//! The compressor pulls input through [`Source`] so that it never needs
//! to know whether the data lives in one contiguous buffer or is
//! scattered across segments. A source hands out its next contiguous run
//! and is advanced with [`Source::skip`].

/// A read-only, possibly-segmented view over input bytes.
pub trait Source {
    /// Total bytes remaining.
    fn available(&self) -> usize;

    /// The next contiguous run of bytes. Empty only when the source is
    /// exhausted.
    fn peek(&self) -> &[u8];

    /// Advance past `n` bytes. `n` must not exceed `peek().len()`.
    fn skip(&mut self, n: usize);
}

/// Source over a single contiguous byte slice.
pub struct ByteSource<'a> {
    data: &'a [u8],
}

impl<'a> ByteSource<'a> {
    /// Create a source over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl Source for ByteSource<'_> {
    fn available(&self) -> usize {
        self.data.len()
    }

    fn peek(&self) -> &[u8] {
        self.data
    }

    fn skip(&mut self, n: usize) {
        debug_assert!(n <= self.data.len());
        self.data = &self.data[n..];
    }
}

/// Source over an ordered sequence of segments.
///
/// Segments of length zero are allowed anywhere; `peek` never returns an
/// empty run while bytes remain.
pub struct SegmentSource<'a> {
    segments: &'a [&'a [u8]],
    seg: usize,
    off: usize,
    remaining: usize,
}

impl<'a> SegmentSource<'a> {
    /// Create a source over `segments`.
    pub fn new(segments: &'a [&'a [u8]]) -> Self {
        let remaining = segments.iter().map(|s| s.len()).sum();
        let mut source = Self {
            segments,
            seg: 0,
            off: 0,
            remaining,
        };
        source.advance_past_empty();
        source
    }

    fn advance_past_empty(&mut self) {
        while self.seg < self.segments.len() && self.off == self.segments[self.seg].len() {
            self.seg += 1;
            self.off = 0;
        }
    }
}

impl Source for SegmentSource<'_> {
    fn available(&self) -> usize {
        self.remaining
    }

    fn peek(&self) -> &[u8] {
        if self.seg < self.segments.len() {
            &self.segments[self.seg][self.off..]
        } else {
            &[]
        }
    }

    fn skip(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        debug_assert!(n <= self.segments[self.seg].len() - self.off);
        self.off += n;
        self.remaining -= n;
        self.advance_past_empty();
    }
}
