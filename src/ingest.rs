//! Stdin ingest task
//!
//! Reads newline-delimited text from the input stream through a bounded
//! buffer and feeds it to the shared LogBuffer, one line per call. The
//! bound mirrors the legacy reader: a line longer than the read chunk
//! arrives as several chunks, each ingested as its own line, and an
//! unterminated remainder at EOF is flushed as a final line.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;

use crate::Result;
use crate::buffer::LogBuffer;

/// Size of one bounded input read.
const READ_CHUNK: usize = 1024;

/// Run the ingest loop until the input stream ends.
///
/// Takes the shared lock once per ingested line; input is consumed and
/// buffered in the exact order it arrives. EOF ends this task without
/// ending the process - the command server keeps answering queries over
/// whatever was buffered.
pub async fn run<R>(input: R, state: Arc<Mutex<LogBuffer>>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(input);
    // pending holds a partial line, never longer than READ_CHUNK - 1
    let mut pending: Vec<u8> = Vec::with_capacity(READ_CHUNK);

    loop {
        let consumed = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                if !pending.is_empty() {
                    state.lock().await.ingest(&pending);
                    pending.clear();
                }
                break;
            }
            let room = (READ_CHUNK - 1) - pending.len();
            let take = available.len().min(room);
            let newline = available[..take].iter().position(|&b| b == b'\n');
            let end = match newline {
                Some(i) => i + 1,
                None => take,
            };
            pending.extend_from_slice(&available[..end]);
            if newline.is_some() || pending.len() == READ_CHUNK - 1 {
                state.lock().await.ingest(&pending);
                pending.clear();
            }
            end
        };
        reader.consume(consumed);
    }

    tracing::info!("input stream closed, ingest task exiting");
    Ok(())
}
