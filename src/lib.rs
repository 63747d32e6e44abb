//! Logring: rolling in-memory log buffer
//!
//! Takes a stream of log lines from stdin (usually supplied from a pipe)
//! and holds the most recent of them in a fixed-size rolling buffer.
//! A plain-text socket interface answers queries about the buffered lines.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod server;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogringError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Line of {len} bytes exceeds buffer capacity {capacity}")]
    LineTooLarge { len: usize, capacity: usize },

    #[error("Byte range {start}..{end} is outside buffer capacity {capacity}")]
    InvalidRange {
        start: usize,
        end: usize,
        capacity: usize,
    },

    #[error("Line index {0} is out of range")]
    InvalidIndex(usize),

    #[error("{0}")]
    MalformedRequest(String),
}

pub type Result<T> = std::result::Result<T, LogringError>;
