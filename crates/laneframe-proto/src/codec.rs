//! Newline-delimited JSON codec for feed lines.
//!
//! Each line on the feed socket is one JSON-encoded [`FrameUpdate`] followed
//! by `\n`. The decoder is incremental: callers feed it raw reads and pop
//! complete lines, so a read boundary in the middle of an update never
//! corrupts parsing.

use bytes::{BufMut, BytesMut};

use crate::{
    errors::{ProtocolError, Result},
    update::FrameUpdate,
};

/// Maximum accepted length of a single feed line, in bytes.
///
/// A full snapshot of every addressable console channel fits in a few
/// kilobytes; a line approaching this bound indicates a corrupt or hostile
/// peer and the connection should be dropped rather than buffered further.
pub const MAX_LINE: usize = 64 * 1024;

/// Encode one update as a feed line into `dst`.
///
/// # Errors
///
/// - [`ProtocolError::Encode`] if JSON serialization fails.
pub fn encode_update(update: &FrameUpdate, dst: &mut impl BufMut) -> Result<()> {
    let json = serde_json::to_vec(update).map_err(|e| ProtocolError::Encode(e.to_string()))?;

    dst.put_slice(&json);
    dst.put_u8(b'\n');

    Ok(())
}

/// Decode one feed line (without its terminator) into an update.
///
/// # Errors
///
/// - [`ProtocolError::MalformedUpdate`] if the line is not valid JSON or
///   does not match the update shape.
pub fn decode_update(line: &[u8]) -> Result<FrameUpdate> {
    Ok(serde_json::from_slice(line)?)
}

/// Incremental line splitter with a size bound.
///
/// Buffers raw socket reads and yields complete lines. The bound is checked
/// on every push so an unterminated stream cannot grow the buffer without
/// limit.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: BytesMut,
}

impl LineDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the socket.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::LineTooLong`] if the buffered, unterminated data
    ///   exceeds [`MAX_LINE`]. The decoder is poisoned at that point and the
    ///   caller should drop the connection.
    pub fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);

        if self.buf.len() > MAX_LINE && !self.buf[..].contains(&b'\n') {
            return Err(ProtocolError::LineTooLong { size: self.buf.len(), max: MAX_LINE });
        }

        Ok(())
    }

    /// Pop the next complete line, without its `\n` terminator.
    ///
    /// Returns `None` when no full line is buffered yet. An over-long
    /// terminated line is reported as an error and discarded, leaving the
    /// decoder usable for subsequent lines.
    pub fn next_line(&mut self) -> Option<Result<BytesMut>> {
        let pos = self.buf[..].iter().position(|&b| b == b'\n')?;

        let mut line = self.buf.split_to(pos + 1);
        line.truncate(pos);

        if line.len() > MAX_LINE {
            return Some(Err(ProtocolError::LineTooLong { size: line.len(), max: MAX_LINE }));
        }

        Some(Ok(line))
    }
}
