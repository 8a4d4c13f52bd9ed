//! Server error types.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the background service.
///
/// Failures of the commands themselves never show up here; they travel
/// back inside the reply envelope.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The background task is gone, or dropped a reply.
    #[error("Background service is not running")]
    ChannelClosed,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
