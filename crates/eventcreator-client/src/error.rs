//! Client error types.

use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Setting up the Google clients failed.
    Provider(String),
    /// The background service could not be reached.
    Server(String),
    /// A command came back with `success: false`.
    Command(String),
    /// Bad command-line input.
    Input(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Server(msg) => write!(f, "background service error: {}", msg),
            Self::Command(msg) => write!(f, "{}", msg),
            Self::Input(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<eventcreator_providers::ProviderError> for ClientError {
    fn from(err: eventcreator_providers::ProviderError) -> Self {
        Self::Provider(err.message().to_string())
    }
}

impl From<eventcreator_server::ServerError> for ClientError {
    fn from(err: eventcreator_server::ServerError) -> Self {
        Self::Server(err.to_string())
    }
}

impl From<eventcreator_core::TimeError> for ClientError {
    fn from(err: eventcreator_core::TimeError) -> Self {
        Self::Input(err.to_string())
    }
}
