//! Fixed-capacity circular byte storage
//!
//! The ByteRing holds the raw text of every buffered line, concatenated.
//! When the write cursor runs out of room at the tail, writing restarts
//! at offset 0 - a line is never split across the wrap boundary.

use crate::{LogringError, Result};

/// Half-open byte range `[start, end)` into the ring storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Half-open interval intersection test.
    ///
    /// Collapses the four overlap configurations (range crossing the
    /// other's start, crossing its end, contained, containing) into one
    /// comparison.
    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }
}

/// Fixed-capacity circular byte buffer.
///
/// Only the ingest path mutates the ring; queries read copies of byte
/// ranges out of it. The ring never shrinks.
pub struct ByteRing {
    /// The underlying storage
    data: Vec<u8>,
    /// Byte-level start cursor. Exists only for the `buffer positions`
    /// diagnostic; eviction happens at line granularity and never
    /// advances it.
    start: usize,
    /// Offset of the next write, wraps at capacity
    write_cursor: usize,
}

impl ByteRing {
    /// Allocate a ring with the given capacity in bytes.
    ///
    /// Capacity must be non-zero; the buffer cannot operate without its
    /// backing storage.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(LogringError::Config(
                "byte ring capacity must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            data: vec![0; capacity],
            start: 0,
            write_cursor: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Append one complete line to the ring.
    ///
    /// If the line does not fit between the write cursor and the end of
    /// the ring, writing restarts at offset 0. Any partially stale bytes
    /// left at the tail are retired later by overlap eviction, not
    /// zeroed here. Returns the absolute range the line occupies and
    /// advances the write cursor to its end.
    ///
    /// Fails with `LineTooLarge` when the line exceeds total capacity;
    /// callers must bound input before appending.
    pub fn append(&mut self, line: &[u8]) -> Result<ByteRange> {
        if line.len() > self.capacity() {
            return Err(LogringError::LineTooLarge {
                len: line.len(),
                capacity: self.capacity(),
            });
        }
        let start = if self.write_cursor + line.len() <= self.capacity() {
            self.write_cursor
        } else {
            0
        };
        let range = ByteRange {
            start,
            end: start + line.len(),
        };
        self.data[range.start..range.end].copy_from_slice(line);
        self.write_cursor = range.end;
        Ok(range)
    }

    /// Copy the bytes across `[start, end)` out of the ring.
    pub fn read_range(&self, range: ByteRange) -> Result<Vec<u8>> {
        if range.end > self.capacity() || range.is_empty() {
            return Err(LogringError::InvalidRange {
                start: range.start,
                end: range.end,
                capacity: self.capacity(),
            });
        }
        Ok(self.data[range.start..range.end].to_vec())
    }

    /// Raw `(start, write_cursor)` diagnostic pair.
    pub fn positions(&self) -> (usize, usize) {
        (self.start, self.write_cursor)
    }
}
