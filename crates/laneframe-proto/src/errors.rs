//! Error types for wire encoding and decoding.
//!
//! A malformed feed line is a per-message condition: the receiver drops the
//! line and keeps the session alive, so these errors carry enough detail for
//! a log entry but are never fatal to a connection.

use thiserror::Error;

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding feed lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload was not a valid JSON frame update.
    #[error("malformed update: {0}")]
    MalformedUpdate(String),

    /// A feed line exceeded the size bound before a terminator was seen.
    #[error("line too long: {size} bytes exceeds {max}")]
    LineTooLong {
        /// Bytes buffered when the bound was hit.
        size: usize,
        /// The configured bound.
        max: usize,
    },

    /// Update could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedUpdate(err.to_string())
    }
}
