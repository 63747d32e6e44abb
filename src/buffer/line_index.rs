//! Fixed-capacity ring of line descriptors
//!
//! Each slot records where one ingested line lives inside the ByteRing
//! and when it was captured. The ring keeps an explicit live count next
//! to its start/end indices, so a completely full ring is never
//! mistaken for an empty one.

use chrono::{DateTime, Utc};

use super::byte_ring::ByteRange;
use crate::{LogringError, Result};

/// One entry in the line index ring: the byte range of a single
/// ingested line and its capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDescriptor {
    pub range: ByteRange,
    pub timestamp: DateTime<Utc>,
}

/// Circular array of line descriptors.
///
/// The live descriptors are the circular span of `len` slots beginning
/// at `start`; `end` is the slot of the newest line. Allocating into a
/// full ring drops the oldest descriptor first.
pub struct LineIndexRing {
    slots: Vec<Option<LineDescriptor>>,
    /// Slot of the oldest live descriptor
    start: usize,
    /// Slot of the newest live descriptor
    end: usize,
    /// Number of live descriptors, maintained alongside the indices
    len: usize,
}

impl LineIndexRing {
    /// Allocate a ring with the given number of descriptor slots.
    pub fn new(slot_count: usize) -> Result<Self> {
        if slot_count == 0 {
            return Err(LogringError::Config(
                "line index ring needs at least one slot".to_string(),
            ));
        }
        Ok(Self {
            slots: vec![None; slot_count],
            start: 0,
            end: 0,
            len: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live descriptors.
    pub fn count(&self) -> usize {
        self.len
    }

    /// Reserve the slot for a new line, returning its index.
    ///
    /// Advances `end` circularly; when the ring is already full the
    /// oldest descriptor is dropped first so the indices never collide.
    /// The first allocation into an empty ring takes the current start
    /// slot without advancing anything.
    pub fn allocate_slot(&mut self) -> usize {
        if self.len == self.capacity() {
            self.slots[self.start] = None;
            self.start = (self.start + 1) % self.capacity();
        } else {
            self.len += 1;
        }
        self.end = if self.len == 1 {
            self.start
        } else {
            (self.end + 1) % self.capacity()
        };
        self.end
    }

    /// Store a descriptor into a previously allocated slot.
    pub fn set(&mut self, slot: usize, descriptor: LineDescriptor) {
        self.slots[slot] = Some(descriptor);
    }

    pub fn get(&self, slot: usize) -> Option<&LineDescriptor> {
        self.slots.get(slot).and_then(|d| d.as_ref())
    }

    /// Map a logical index (0 = oldest live line) to a physical slot.
    pub fn resolve(&self, logical: usize) -> Result<usize> {
        if logical >= self.len {
            return Err(LogringError::InvalidIndex(logical));
        }
        Ok((self.start + logical) % self.capacity())
    }

    /// Drop the oldest live descriptor, returning it.
    pub fn retire_oldest(&mut self) -> Option<LineDescriptor> {
        if self.len == 0 {
            return None;
        }
        let descriptor = self.slots[self.start].take();
        self.start = (self.start + 1) % self.capacity();
        self.len -= 1;
        descriptor
    }

    /// Drop the newest live descriptor.
    ///
    /// Only used to undo a reservation whose byte append failed.
    pub fn retire_newest(&mut self) {
        if self.len == 0 {
            return;
        }
        self.slots[self.end] = None;
        self.end = if self.end == 0 {
            self.capacity() - 1
        } else {
            self.end - 1
        };
        self.len -= 1;
    }

    /// Raw `(start, end)` diagnostic pair.
    pub fn positions(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(start: usize, end: usize) -> LineDescriptor {
        LineDescriptor {
            range: ByteRange { start, end },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_ring_counts_zero() {
        let ring = LineIndexRing::new(4).unwrap();
        assert_eq!(ring.count(), 0);
        assert!(matches!(
            ring.resolve(0),
            Err(LogringError::InvalidIndex(0))
        ));
    }

    #[test]
    fn zero_slots_rejected() {
        assert!(matches!(
            LineIndexRing::new(0),
            Err(LogringError::Config(_))
        ));
    }

    #[test]
    fn first_allocation_uses_start_slot() {
        let mut ring = LineIndexRing::new(4).unwrap();
        let slot = ring.allocate_slot();
        ring.set(slot, descriptor(0, 10));
        assert_eq!(ring.count(), 1);
        assert_eq!(ring.resolve(0).unwrap(), slot);
    }

    #[test]
    fn logical_order_is_allocation_order() {
        let mut ring = LineIndexRing::new(4).unwrap();
        for i in 0..3 {
            let slot = ring.allocate_slot();
            ring.set(slot, descriptor(i * 10, i * 10 + 10));
        }
        assert_eq!(ring.count(), 3);
        for i in 0..3 {
            let slot = ring.resolve(i).unwrap();
            assert_eq!(ring.get(slot).unwrap().range.start, i * 10);
        }
    }

    #[test]
    fn full_ring_is_not_reported_empty() {
        let mut ring = LineIndexRing::new(4).unwrap();
        for i in 0..4 {
            let slot = ring.allocate_slot();
            ring.set(slot, descriptor(i, i + 1));
        }
        assert_eq!(ring.count(), 4);
    }

    #[test]
    fn allocating_past_capacity_drops_exactly_the_oldest() {
        let mut ring = LineIndexRing::new(4).unwrap();
        for i in 0..6 {
            let slot = ring.allocate_slot();
            ring.set(slot, descriptor(i * 10, i * 10 + 10));
        }
        assert_eq!(ring.count(), 4);
        // lines 0 and 1 were dropped; oldest survivor is line 2
        let oldest = ring.resolve(0).unwrap();
        assert_eq!(ring.get(oldest).unwrap().range.start, 20);
        let newest = ring.resolve(3).unwrap();
        assert_eq!(ring.get(newest).unwrap().range.start, 50);
    }

    #[test]
    fn retire_oldest_advances_start() {
        let mut ring = LineIndexRing::new(4).unwrap();
        for i in 0..3 {
            let slot = ring.allocate_slot();
            ring.set(slot, descriptor(i * 10, i * 10 + 10));
        }
        let retired = ring.retire_oldest().unwrap();
        assert_eq!(retired.range.start, 0);
        assert_eq!(ring.count(), 2);
        let oldest = ring.resolve(0).unwrap();
        assert_eq!(ring.get(oldest).unwrap().range.start, 10);
    }

    #[test]
    fn retire_newest_undoes_reservation() {
        let mut ring = LineIndexRing::new(4).unwrap();
        let slot = ring.allocate_slot();
        ring.set(slot, descriptor(0, 10));
        ring.allocate_slot();
        ring.retire_newest();
        assert_eq!(ring.count(), 1);
        assert_eq!(ring.resolve(0).unwrap(), slot);
    }

    #[test]
    fn resolve_honors_wraparound() {
        let mut ring = LineIndexRing::new(3).unwrap();
        for i in 0..5 {
            let slot = ring.allocate_slot();
            ring.set(slot, descriptor(i, i + 1));
        }
        // live lines are 2, 3, 4; start has wrapped past slot 0
        assert_eq!(ring.count(), 3);
        for logical in 0..3 {
            let slot = ring.resolve(logical).unwrap();
            assert_eq!(ring.get(slot).unwrap().range.start, logical + 2);
        }
        assert!(ring.resolve(3).is_err());
    }
}
