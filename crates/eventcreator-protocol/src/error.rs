//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding commands or encoding envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The message is not valid JSON or does not name a known action.
    #[error("invalid message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Empty message received.
    #[error("empty message")]
    EmptyMessage,
}
