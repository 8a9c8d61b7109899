//! TCP transport for the feed client.
//!
//! Provides [`FeedConnection`], a thin I/O layer: a spawned reader task
//! splits the socket into lines, parses each line as a frame update, and
//! pushes the results into a bounded channel. Malformed lines are dropped
//! with a warning and the session keeps listening - a single bad payload
//! must never terminate the feed.

use bytes::BytesMut;
use laneframe_proto::{FrameUpdate, LineDecoder, ProtocolError, decode_update};
use thiserror::Error;
use tokio::{
    io::AsyncReadExt,
    net::TcpStream,
    sync::mpsc,
};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Socket I/O failed after the connection was established.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Handle to a connected feed.
///
/// Parsed updates arrive on [`updates`](Self::updates) in delivery order; an
/// internal task owns the socket I/O. Dropping the handle (or calling
/// [`stop`](Self::stop)) aborts that task and closes the connection.
pub struct FeedConnection {
    /// Parsed updates from the server, in delivery order.
    pub updates: mpsc::Receiver<FrameUpdate>,
    /// Abort handle for the reader task.
    abort_handle: tokio::task::AbortHandle,
}

impl FeedConnection {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for FeedConnection {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect to a feed server.
///
/// # Errors
///
/// - [`TransportError::Connection`] if the TCP connect fails.
pub async fn connect(addr: &str) -> Result<FeedConnection, TransportError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| TransportError::Connection(format!("connect to {addr} failed: {e}")))?;

    let (tx, rx) = mpsc::channel::<FrameUpdate>(32);
    let handle = tokio::spawn(run_connection(stream, tx));

    Ok(FeedConnection { updates: rx, abort_handle: handle.abort_handle() })
}

/// Read the socket until EOF, pushing parsed updates into the channel.
async fn run_connection(mut stream: TcpStream, tx: mpsc::Sender<FrameUpdate>) {
    let mut decoder = LineDecoder::new();
    let mut buf = BytesMut::with_capacity(8192);

    loop {
        buf.clear();
        match stream.read_buf(&mut buf).await {
            Ok(0) => {
                tracing::debug!("feed closed by server");
                break;
            },
            Ok(_) => {},
            Err(e) => {
                tracing::debug!("feed read error: {e}");
                break;
            },
        }

        if let Err(e @ ProtocolError::LineTooLong { .. }) = decoder.push(&buf) {
            tracing::warn!("dropping feed connection: {e}");
            break;
        }

        while let Some(line) = decoder.next_line() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("dropping oversize feed line: {e}");
                    continue;
                },
            };

            match decode_update(&line) {
                Ok(update) => {
                    if tx.send(update).await.is_err() {
                        // Receiver gone: the ingestor stopped listening.
                        return;
                    }
                },
                Err(e) => {
                    tracing::warn!("dropping malformed feed line: {e}");
                },
            }
        }
    }
}
