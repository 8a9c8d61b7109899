//! Subscriber registry for feed broadcast.
//!
//! Tracks connected display clients as session id → outbound line sender.
//! The broadcast path fans a finished feed line out to every live sender;
//! sessions whose receiver is gone are pruned on the spot, so the registry
//! never accumulates dead entries.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Registry of connected feed subscribers.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    /// Session id → outbound line channel.
    subscribers: HashMap<u64, mpsc::Sender<Bytes>>,
    /// Next session id to hand out.
    next_session: u64,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and allocate its session id.
    pub fn register(&mut self, sender: mpsc::Sender<Bytes>) -> u64 {
        let session_id = self.next_session;
        self.next_session += 1;
        self.subscribers.insert(session_id, sender);
        session_id
    }

    /// Remove a subscriber. Returns `false` if the session was unknown.
    pub fn unregister(&mut self, session_id: u64) -> bool {
        self.subscribers.remove(&session_id).is_some()
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True if no subscribers are connected.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Fan one feed line out to every subscriber.
    ///
    /// Returns the number of sessions the line was queued for. A subscriber
    /// with a full queue skips this line (a display that lags simply misses
    /// a tick - the next snapshot supersedes it); a subscriber whose channel
    /// is closed is pruned.
    pub fn broadcast(&mut self, line: &Bytes) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (&session_id, sender) in &self.subscribers {
            match sender.try_send(line.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(session_id, "subscriber lagging, skipping tick");
                },
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    dead.push(session_id);
                },
            }
        }

        for session_id in dead {
            tracing::debug!(session_id, "pruning closed subscriber");
            self.subscribers.remove(&session_id);
        }

        delivered
    }
}
