//! Rolling log buffer - the core of logring
//!
//! Two fixed-size rings layered on each other: a ByteRing holding raw
//! line text and a LineIndexRing describing where each line lives.
//!
//! # Architecture
//!
//! ```text
//! stdin ──► ingest task ──► ┌─────────────────────────┐
//!                           │        LogBuffer        │
//!                           │  ┌───────────────────┐  │
//!                           │  │     ByteRing      │  │
//!                           │  └───────────────────┘  │
//!                           │  ┌───────────────────┐  │
//!                           │  │   LineIndexRing   │  │
//!                           │  └───────────────────┘  │
//!                           └─────────────────────────┘
//!                                       ▲
//!                  command server ──────┘ (queries)
//! ```
//!
//! Both rings form one logical resource: the server wraps the LogBuffer
//! in a single `Arc<Mutex<..>>` held for the whole of each ingest and
//! each query, so a query never observes a half-updated descriptor.
//!
//! Because the ByteRing is finite, writing a new line may physically
//! overwrite the bytes backing older, still-indexed lines. Ingest ends
//! with an overlap scan that excises any such clobbered descriptors.

pub mod byte_ring;
pub mod line_index;

pub use byte_ring::{ByteRange, ByteRing};
pub use line_index::{LineDescriptor, LineIndexRing};

use chrono::{DateTime, Utc};

use crate::Result;
use crate::config::BufferConfig;

/// The rolling log buffer: one ByteRing plus one LineIndexRing.
///
/// Exclusively owns both rings; queries hand out rendered copies, never
/// references into ring storage.
pub struct LogBuffer {
    bytes: ByteRing,
    lines: LineIndexRing,
}

impl LogBuffer {
    /// Allocate both rings with the configured capacities.
    ///
    /// This is the only fallible allocation in the process; without the
    /// two rings there is nothing to run.
    pub fn new(config: &BufferConfig) -> Result<Self> {
        Ok(Self {
            bytes: ByteRing::new(config.byte_capacity)?,
            lines: LineIndexRing::new(config.line_slots)?,
        })
    }

    /// Ingest one received input line.
    ///
    /// Lines longer than `capacity - 1` bytes are truncated and kept
    /// (truncate-and-continue, never fatal). After the line is written
    /// and indexed, any older descriptor whose bytes it overwrote is
    /// retired.
    pub fn ingest(&mut self, line: &[u8]) {
        let max = self.bytes.capacity() - 1;
        let bounded = if line.len() > max {
            tracing::warn!(len = line.len(), max, "truncating oversized input line");
            &line[..max]
        } else {
            line
        };
        if bounded.is_empty() {
            return;
        }
        let slot = self.lines.allocate_slot();
        let range = match self.bytes.append(bounded) {
            Ok(range) => range,
            Err(err) => {
                // unreachable after bounding, but a reserved slot must
                // not be left dangling
                tracing::error!("append failed: {err}");
                self.lines.retire_newest();
                return;
            }
        };
        self.lines.set(
            slot,
            LineDescriptor {
                range,
                timestamp: Utc::now(),
            },
        );
        self.evict_overlapping(slot, range);
    }

    /// Retire every still-live descriptor whose byte range intersects
    /// the range just written.
    ///
    /// Scans oldest-first and stops at the first non-overlapping
    /// descriptor, matching the ring's write order; the just-written
    /// slot itself is exempt. Bounded by the live count.
    fn evict_overlapping(&mut self, new_slot: usize, new_range: ByteRange) {
        let mut budget = self.lines.count();
        while budget > 0 {
            let oldest = match self.lines.resolve(0) {
                Ok(slot) => slot,
                Err(_) => break,
            };
            if oldest == new_slot {
                break;
            }
            let overwritten = self
                .lines
                .get(oldest)
                .is_some_and(|d| d.range.overlaps(&new_range));
            if !overwritten {
                break;
            }
            tracing::debug!(slot = oldest, "retiring overwritten line");
            self.lines.retire_oldest();
            budget -= 1;
        }
    }

    /// Number of live lines.
    pub fn line_count(&self) -> usize {
        self.lines.count()
    }

    /// Raw line ring `(start, end)` index pair.
    pub fn line_positions(&self) -> (usize, usize) {
        self.lines.positions()
    }

    /// Raw byte ring `(start, end)` cursor pair.
    pub fn buffer_positions(&self) -> (usize, usize) {
        self.bytes.positions()
    }

    /// Render `n` lines of the current window, clamped to the live
    /// count.
    ///
    /// Inherited contract: this walks the window oldest-first, so it
    /// returns the *oldest* `n` lines rather than the most recent `n`.
    /// Preserved literally; see DESIGN.md.
    pub fn last(&self, n: usize) -> String {
        let n = n.min(self.lines.count());
        let mut reply = String::new();
        for logical in 0..n {
            self.render_line(logical, &mut reply);
        }
        reply
    }

    /// Render every live line captured at or after `cutoff`,
    /// oldest-first.
    pub fn since(&self, cutoff: DateTime<Utc>) -> String {
        let mut reply = String::new();
        for logical in 0..self.lines.count() {
            let captured_after = self
                .lines
                .resolve(logical)
                .ok()
                .and_then(|slot| self.lines.get(slot))
                .is_some_and(|d| d.timestamp >= cutoff);
            if captured_after {
                self.render_line(logical, &mut reply);
            }
        }
        reply
    }

    /// Append the text of one logical line to the reply buffer.
    ///
    /// A slot that fails to resolve or a range that fails to read is
    /// logged and skipped, never fatal.
    fn render_line(&self, logical: usize, reply: &mut String) {
        let slot = match self.lines.resolve(logical) {
            Ok(slot) => slot,
            Err(err) => {
                tracing::warn!(logical, "skipping unresolvable line: {err}");
                return;
            }
        };
        let Some(descriptor) = self.lines.get(slot) else {
            tracing::warn!(slot, "skipping empty descriptor slot");
            return;
        };
        match self.bytes.read_range(descriptor.range) {
            Ok(bytes) => reply.push_str(&String::from_utf8_lossy(&bytes)),
            Err(err) => {
                tracing::warn!(slot, "skipping unreadable line range: {err}");
            }
        }
    }
}
