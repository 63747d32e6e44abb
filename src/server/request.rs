//! Command protocol requests
//!
//! One request line per connection, parsed once into a tagged variant
//! and matched exhaustively by the dispatcher. The wire surface is the
//! legacy one, literal and case-sensitive.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{LogringError, Result};

/// Timestamp format accepted by `since`, taken as UTC.
const SINCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Static usage text returned for `help`.
pub const HELP_TEXT: &str = "help:\n\
    \tbuffer positions\n\
    \tlast <n>\n\
    \tline count|indexes\n\
    \tsince <YYYY-MM-DDThh:mm:ss>\n\
    \tshutdown\n";

/// A parsed command-protocol request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// `buffer positions` - byte ring cursor pair
    BufferPositions,
    /// `help` - static usage text
    Help,
    /// `last <n>` - render n lines of the current window
    Last(usize),
    /// `line count` - live line count
    LineCount,
    /// `line indexes` - line ring index pair
    LineIndexes,
    /// `since <timestamp>` - render lines captured at or after a time
    Since(DateTime<Utc>),
    /// `shutdown` - acknowledge, then stop the server
    Shutdown,
}

impl Request {
    /// Parse one request line.
    ///
    /// A malformed argument or an unrecognized request yields
    /// `MalformedRequest` carrying the exact reply text; the caller
    /// sends it back verbatim.
    pub fn parse(line: &str) -> Result<Self> {
        match line {
            "buffer positions" => Ok(Self::BufferPositions),
            "help" => Ok(Self::Help),
            "line count" => Ok(Self::LineCount),
            "line indexes" => Ok(Self::LineIndexes),
            "shutdown" => Ok(Self::Shutdown),
            _ => {
                if let Some(arg) = line.strip_prefix("last ") {
                    return arg.trim().parse::<usize>().map(Self::Last).map_err(|_| {
                        LogringError::MalformedRequest(format!(
                            "Could not parse last line count: {line}."
                        ))
                    });
                }
                if let Some(arg) = line.strip_prefix("since ") {
                    return NaiveDateTime::parse_from_str(arg.trim(), SINCE_FORMAT)
                        .map(|t| Self::Since(t.and_utc()))
                        .map_err(|_| {
                            LogringError::MalformedRequest(format!(
                                "Could not parse since timestamp: {line}."
                            ))
                        });
                }
                Err(LogringError::MalformedRequest(
                    "failed message unknown".to_string(),
                ))
            }
        }
    }
}
