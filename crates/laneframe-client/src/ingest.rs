//! Update ingestion lifecycle.
//!
//! [`Ingestor`] is the context object consumers construct once and thread to
//! whatever reads the snapshot: it owns the [`ChannelStore`], the connection
//! state machine, and the single consuming path that applies updates in
//! delivery order.
//!
//! The state machine has exactly two states, Disconnected (initial) and
//! Listening. Both transitions are idempotent, but they are not commutative
//! with message delivery: an update already dispatched by the transport when
//! [`stop`](Ingestor::stop) flips the state is discarded by the liveness
//! check in [`deliver`](Ingestor::deliver), never merged.

use laneframe_core::{ChannelStore, MergeOutcome};
use laneframe_proto::FrameUpdate;

use crate::transport::{FeedConnection, TransportError, connect};

/// Connection lifecycle state.
enum IngestState {
    /// Not connected; deliveries are discarded.
    Disconnected,
    /// Connected and consuming the feed.
    Listening(FeedConnection),
}

/// Feed consumer: snapshot plus connection lifecycle.
///
/// All mutation of the snapshot happens on the caller's task, inside
/// [`next_merge`](Self::next_merge) or [`deliver`](Self::deliver) - merge is
/// synchronous and non-blocking, so there is exactly one consumer and no
/// locking.
pub struct Ingestor {
    store: ChannelStore,
    state: IngestState,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    /// Create a disconnected ingestor with an empty snapshot.
    pub fn new() -> Self {
        Self { store: ChannelStore::new(), state: IngestState::Disconnected }
    }

    /// The live snapshot.
    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    /// True while connected to a feed.
    pub fn is_listening(&self) -> bool {
        matches!(self.state, IngestState::Listening(_))
    }

    /// Connect to a feed server and begin listening.
    ///
    /// Calling while already listening is a no-op: the existing connection
    /// is kept and no second consumer is registered. To reconnect, call
    /// [`stop`](Self::stop) first.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Connection`] if the connect fails; the ingestor
    ///   stays Disconnected and `start` may be retried.
    pub async fn start(&mut self, addr: &str) -> Result<(), TransportError> {
        if self.is_listening() {
            tracing::debug!("start while listening ignored");
            return Ok(());
        }

        let conn = connect(addr).await?;
        self.state = IngestState::Listening(conn);
        Ok(())
    }

    /// Close the feed connection.
    ///
    /// Idempotent. Updates still queued from the old connection are dropped
    /// along with it; the snapshot keeps its last merged state.
    pub fn stop(&mut self) {
        if let IngestState::Listening(conn) = &self.state {
            conn.stop();
        }
        self.state = IngestState::Disconnected;
    }

    /// Wait for the next update and merge it.
    ///
    /// Returns `None` when disconnected or when the server closed the feed;
    /// in the latter case the ingestor still reports listening until
    /// [`stop`](Self::stop) - reconnect policy belongs to the caller.
    pub async fn next_merge(&mut self) -> Option<MergeOutcome> {
        let update = {
            let IngestState::Listening(conn) = &mut self.state else {
                return None;
            };
            conn.updates.recv().await?
        };

        self.deliver(update)
    }

    /// Apply an already-parsed update if currently listening.
    ///
    /// This is the message-handling path: the liveness check lives here, so
    /// an update that arrives after [`stop`](Self::stop) is discarded
    /// (returns `None`) rather than merged.
    pub fn deliver(&mut self, update: FrameUpdate) -> Option<MergeOutcome> {
        match self.state {
            IngestState::Listening(_) => Some(self.store.merge(&update)),
            IngestState::Disconnected => {
                tracing::debug!(value = update.value, "discarding update while disconnected");
                None
            },
        }
    }
}
