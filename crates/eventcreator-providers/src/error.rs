//! Error types for session, sign-in and Calendar API operations.
//!
//! Every failure carries a user-facing message; the dispatcher forwards
//! [`ProviderError::message`] verbatim in its failure envelope.

use std::fmt;
use thiserror::Error;

/// Shown when an operation needs a session and none is stored.
pub const UNAUTHENTICATED_MESSAGE: &str = "Not authenticated. Please sign in.";

/// Shown when the access token expired and could not be refreshed.
pub const REAUTH_REQUIRED_MESSAGE: &str = "Token expired. Please sign in again.";

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// No stored session.
    Unauthenticated,
    /// The session expired and refresh failed.
    ReauthRequired,
    /// The Calendar API or OAuth endpoint reported an error.
    Api,
    /// Connection failed, timeout, DNS resolution, etc.
    Transport,
    /// The redirect URI reported by the host has the wrong shape.
    MisconfiguredRedirect,
    /// The interactive sign-in was dismissed or denied.
    UserCancelled,
    /// A response could not be parsed.
    InvalidResponse,
    /// The session store could not be read or written.
    Storage,
    /// Missing or invalid configuration.
    Configuration,
    /// The event draft failed validation before anything was sent.
    InvalidDraft,
}

impl ProviderErrorCode {
    /// Returns true if signing in again is the way out of this error.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::ReauthRequired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::ReauthRequired => "reauth_required",
            Self::Api => "api_error",
            Self::Transport => "transport_error",
            Self::MisconfiguredRedirect => "misconfigured_redirect",
            Self::UserCancelled => "user_cancelled",
            Self::InvalidResponse => "invalid_response",
            Self::Storage => "storage_error",
            Self::Configuration => "configuration_error",
            Self::InvalidDraft => "invalid_draft",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from the session store, the token broker or the Calendar client.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// No session is stored.
    pub fn unauthenticated() -> Self {
        Self::new(ProviderErrorCode::Unauthenticated, UNAUTHENTICATED_MESSAGE)
    }

    /// The access token expired and could not be refreshed.
    pub fn reauth_required() -> Self {
        Self::new(ProviderErrorCode::ReauthRequired, REAUTH_REQUIRED_MESSAGE)
    }

    /// The host's redirect URI does not look like an extension redirect.
    pub fn misconfigured_redirect(redirect_uri: &str) -> Self {
        Self::new(
            ProviderErrorCode::MisconfiguredRedirect,
            format!(
                "Invalid redirect URI format: {}. Make sure extension is loaded correctly.",
                redirect_uri
            ),
        )
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Api, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Transport, message)
    }

    pub fn user_cancelled(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::UserCancelled, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Storage, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Configuration, message)
    }

    pub fn invalid_draft(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidDraft, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn requires_login(&self) -> bool {
        self.code.requires_login()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
