//! Command server - the query socket
//!
//! Listens on a TCP port for plain-text queries against the shared
//! LogBuffer. Each accepted connection carries exactly one request line
//! and receives exactly one reply, then the server closes it.
//!
//! `shutdown` is acknowledged on the requesting connection first; the
//! accept loop then stops, already-accepted connections are allowed to
//! finish their replies, and `run` returns.

pub mod request;

pub use request::{HELP_TEXT, Request};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;

use crate::buffer::LogBuffer;
use crate::{LogringError, Result};

/// One reply to one request.
struct Reply {
    text: String,
    /// The server stops accepting after this reply is written
    shutdown: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shutdown: false,
        }
    }
}

/// The logring command server.
pub struct CommandServer {
    listener: TcpListener,
    state: Arc<Mutex<LogBuffer>>,
}

impl CommandServer {
    /// Bind the query socket on the given port (0 picks a free one).
    pub async fn bind(port: u16, state: Arc<Mutex<LogBuffer>>) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        Ok(Self { listener, state })
    }

    /// The bound address, useful when the port was 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve connections until a `shutdown` request.
    ///
    /// Connection handlers run as their own tasks; a failing handler is
    /// logged and dropped, the server continues. After the shutdown
    /// signal the in-flight handlers are awaited so already-accepted
    /// replies still complete.
    pub async fn run(self) -> Result<()> {
        tracing::info!("command server listening on {:?}", self.local_addr()?);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        tracing::debug!(%addr, "connection accepted");
                        let state = self.state.clone();
                        let shutdown_tx = shutdown_tx.clone();
                        handlers.spawn(async move {
                            if let Err(err) = handle_connection(stream, state, shutdown_tx).await {
                                tracing::error!("connection handler error: {err}");
                            }
                        });
                    }
                    Err(err) => {
                        tracing::error!("accept error: {err}");
                    }
                }
            }
        }

        while handlers.join_next().await.is_some() {}
        Ok(())
    }
}

/// Serve one connection: one request line in, one reply out.
async fn handle_connection(
    stream: TcpStream,
    state: Arc<Mutex<LogBuffer>>,
    shutdown: watch::Sender<bool>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut line = String::new();
    BufReader::new(reader).read_line(&mut line).await?;
    let request_line = line.trim_end_matches(['\r', '\n']);
    tracing::info!(request = request_line, "received");

    let reply = match Request::parse(request_line) {
        Ok(request) => {
            let buffer = state.lock().await;
            dispatch(&request, &buffer)
        }
        Err(LogringError::MalformedRequest(text)) => Reply::text(text),
        Err(err) => Reply::text(format!("failed {err}")),
    };

    writer.write_all(reply.text.as_bytes()).await?;
    if !reply.text.ends_with('\n') {
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;

    if reply.shutdown {
        // acknowledged above; now stop the accept loop
        let _ = shutdown.send(true);
    }
    Ok(())
}

/// Map a parsed request onto the query path.
///
/// Runs under the shared lock, so every reply is a consistent snapshot
/// taken between two ingests. Reply formats are the legacy literals.
fn dispatch(request: &Request, buffer: &LogBuffer) -> Reply {
    match request {
        Request::BufferPositions => {
            let (start, end) = buffer.buffer_positions();
            Reply::text(format!("Buffer Positions: Start: {start}, End: {end}"))
        }
        Request::Help => Reply::text(HELP_TEXT),
        Request::Last(n) => Reply::text(buffer.last(*n)),
        Request::LineCount => Reply::text(format!("Line Count: {}", buffer.line_count())),
        Request::LineIndexes => {
            let (start, end) = buffer.line_positions();
            Reply::text(format!("Line Indexes: Start:  {start} End: {end}"))
        }
        Request::Since(cutoff) => Reply::text(buffer.since(*cutoff)),
        Request::Shutdown => Reply {
            text: "ok".to_string(),
            shutdown: true,
        },
    }
}
