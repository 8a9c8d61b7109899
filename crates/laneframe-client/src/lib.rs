//! Feed ingestion client for laneframe displays.
//!
//! Connects to a laneframe feed server, parses the JSON lines it broadcasts
//! into frame updates, and folds them into a local
//! [`ChannelStore`](laneframe_core::ChannelStore) snapshot.
//!
//! # Components
//!
//! - [`transport`]: TCP I/O. A reader task parses feed lines and pushes
//!   updates into a channel; protocol logic never touches the socket.
//! - [`Ingestor`]: the consumer-facing context object. Owns the snapshot,
//!   runs the start/stop lifecycle, and applies updates in delivery order
//!   from a single consuming path.

#![forbid(unsafe_code)]

mod ingest;
pub mod transport;

pub use ingest::Ingestor;
pub use transport::{FeedConnection, TransportError, connect};
