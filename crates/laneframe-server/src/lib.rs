//! Laneframe feed server.
//!
//! Reads a timing console byte stream, maintains the authoritative channel
//! snapshot, and broadcasts it to display clients as JSON feed lines over
//! TCP.
//!
//! # Architecture
//!
//! Three cooperating tasks share the snapshot behind a mutex:
//!
//! - the **reader** parses console bytes and merges completed channel
//!   scans;
//! - the **broadcaster** snapshots the store on a fixed cadence, stamps a
//!   monotonic frame value, and fans the encoded line out through the
//!   [`SubscriberRegistry`];
//! - the **accept loop** registers each client with an outbound line
//!   channel and a writer task.
//!
//! Clients never send anything; a subscriber is just a socket we write
//! lines to until it goes away.

#![forbid(unsafe_code)]

mod error;
mod reader;
mod registry;
mod source;

use std::{path::PathBuf, sync::Arc, time::Duration};

use bytes::{Bytes, BytesMut};
pub use error::ServerError;
use laneframe_core::ChannelStore;
use laneframe_proto::encode_update;
pub use registry::SubscriberRegistry;
pub use source::ByteSource;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::{Mutex, mpsc},
};

/// Feed server configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Address to bind the subscriber listener to.
    pub bind_address: String,
    /// Console device node or capture file to read.
    pub input: PathBuf,
    /// Loop a capture file back to the start on end-of-file.
    pub replay: bool,
    /// Delay between input reads (keeps capture replay near real time).
    pub pace: Duration,
    /// Snapshot broadcast cadence.
    pub broadcast_interval: Duration,
}

impl FeedConfig {
    /// Config for `input` with the defaults the original deployment used:
    /// localhost listener, 10 Hz broadcast, 1 ms read pacing.
    pub fn new(input: PathBuf) -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            input,
            replay: false,
            pace: Duration::from_millis(1),
            broadcast_interval: Duration::from_millis(100),
        }
    }
}

/// Running feed server, bound but not yet serving.
pub struct Feed {
    listener: TcpListener,
    config: FeedConfig,
}

impl Feed {
    /// Bind the subscriber listener.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Transport`] if the bind fails.
    pub async fn bind(config: FeedConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address)
            .await
            .map_err(|e| ServerError::Transport(format!("bind {}: {e}", config.bind_address)))?;

        Ok(Self { listener, config })
    }

    /// Local address the listener is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::Transport(format!("local address: {e}")))
    }

    /// Run the feed: reader, broadcaster, and accept loop.
    ///
    /// Runs until the listener fails. The reader finishing (capture file
    /// without replay) leaves the last snapshot broadcasting.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Input`] if the console input cannot be opened.
    /// - [`ServerError::Transport`] if accepting connections fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let store = Arc::new(Mutex::new(ChannelStore::new()));
        let registry = Arc::new(Mutex::new(SubscriberRegistry::new()));

        let source =
            ByteSource::open(&self.config.input, self.config.replay, self.config.pace).await?;

        let reader_store = Arc::clone(&store);
        tokio::spawn(async move {
            if let Err(e) = reader::run_reader(source, reader_store).await {
                tracing::error!("console reader failed: {e}");
            }
        });

        tokio::spawn(broadcast_loop(
            Arc::clone(&store),
            Arc::clone(&registry),
            self.config.broadcast_interval,
        ));

        tracing::info!("feed listening on {}", self.config.bind_address);

        loop {
            let (socket, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| ServerError::Transport(format!("accept: {e}")))?;

            tracing::info!(%peer, "subscriber connected");
            let registry = Arc::clone(&registry);
            tokio::spawn(handle_subscriber(socket, registry));
        }
    }
}

/// Snapshot the store on every tick and fan it out to subscribers.
async fn broadcast_loop(
    store: Arc<Mutex<ChannelStore>>,
    registry: Arc<Mutex<SubscriberRegistry>>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut value: u64 = 0;

    loop {
        ticker.tick().await;
        value += 1;

        let update = store.lock().await.snapshot_update(value);

        let mut wire = BytesMut::new();
        if let Err(e) = encode_update(&update, &mut wire) {
            tracing::error!("snapshot encode failed: {e}");
            continue;
        }

        let line: Bytes = wire.freeze();
        let delivered = registry.lock().await.broadcast(&line);
        tracing::trace!(value, delivered, "snapshot broadcast");
    }
}

/// Register a subscriber and write feed lines to it until it disconnects.
async fn handle_subscriber(mut socket: TcpStream, registry: Arc<Mutex<SubscriberRegistry>>) {
    let (tx, mut rx) = mpsc::channel::<Bytes>(16);
    let session_id = registry.lock().await.register(tx);

    while let Some(line) = rx.recv().await {
        if let Err(e) = socket.write_all(&line).await {
            tracing::debug!(session_id, "subscriber write failed: {e}");
            break;
        }
    }

    registry.lock().await.unregister(session_id);
    tracing::info!(session_id, "subscriber disconnected");
}
