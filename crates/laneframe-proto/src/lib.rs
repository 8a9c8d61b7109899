//! Wire contract for the laneframe feed.
//!
//! Defines the three layers a frame update passes through on its way from a
//! timing console to a display client:
//!
//! - [`ConsoleParser`]: the console's raw serial byte protocol (control and
//!   segment bytes), parsed into per-channel cell images.
//! - [`FrameUpdate`]: the update data model shared by server and clients.
//! - [`encode_update`] / [`decode_update`] / [`LineDecoder`]:
//!   newline-delimited JSON encoding of updates on the feed socket.
//!
//! This crate is pure data and parsing - it performs no I/O. Transport lives
//! in `laneframe-client` and `laneframe-server`.

#![forbid(unsafe_code)]

mod codec;
mod console;
mod errors;
mod update;

pub use codec::{LineDecoder, MAX_LINE, decode_update, encode_update};
pub use console::{ByteTrace, CellBank, ConsoleParser, is_control_byte};
pub use errors::{ProtocolError, Result};
pub use update::{BLANK_BYTE, CHANNEL_WIDTH, FrameUpdate, PartialChannel};
