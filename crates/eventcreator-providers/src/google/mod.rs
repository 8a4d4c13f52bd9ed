//! Google sign-in and Calendar API.
//!
//! # Authentication Flow
//!
//! 1. The host reports its extension redirect URI (`*.chromiumapp.org`)
//! 2. The broker opens Google's consent page with `response_type=token`
//! 3. The host returns the final redirect URL; tokens come from its fragment
//! 4. The session is persisted and reused until it expires
//! 5. An expired session is refreshed once if a refresh token was granted,
//!    otherwise the user signs in again
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eventcreator_providers::google::{
//!     FileSessionStore, GoogleCalendarClient, GoogleConfig, OAuthClient, TokenBroker,
//! };
//!
//! let config = GoogleConfig::new("1234.apps.googleusercontent.com");
//! let store = Arc::new(FileSessionStore::new(&config.session_path));
//! let broker = Arc::new(TokenBroker::new(store, OAuthClient::new(&config)?, host));
//! let calendar = GoogleCalendarClient::new(&config, broker.clone())?;
//!
//! broker.login().await?;
//! let calendars = calendar.list_calendars().await?;
//! ```

mod broker;
mod client;
mod config;
mod oauth;
mod session;

pub use broker::TokenBroker;
pub use client::{CreatedEvent, GoogleCalendarClient};
pub use config::GoogleConfig;
pub use oauth::{AuthFlowHost, ImplicitGrant, OAuthClient, RefreshedToken, parse_implicit_grant};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
