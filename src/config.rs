//! Buffer sizing configuration.

/// Default length of the byte ring.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Default number of line descriptor slots.
pub const DEFAULT_LINE_SLOTS: usize = 1024;

/// Capacities for the two rings.
///
/// Both have compiled-in defaults; zero values are rejected when the
/// rings are allocated at startup.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    pub byte_capacity: usize,
    pub line_slots: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            byte_capacity: DEFAULT_BUFFER_CAPACITY,
            line_slots: DEFAULT_LINE_SLOTS,
        }
    }
}
