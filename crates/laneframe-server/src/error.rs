//! Server error types.

use thiserror::Error;

/// Errors from the feed server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration (bad bind address, missing input).
    #[error("configuration error: {0}")]
    Config(String),

    /// Listener or subscriber socket failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Console input could not be opened or read.
    #[error("input error: {0}")]
    Input(String),
}
