//! Google sign-in, session persistence and Calendar API access.
//!
//! - [`google::SessionStore`] persists the three session fields as a unit
//! - [`google::TokenBroker`] hands out valid access tokens, refreshing or
//!   signing in as needed
//! - [`google::GoogleCalendarClient`] lists calendars and colors and
//!   creates events
//! - [`ProviderError`] is the shared error type
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   launch_web_auth_flow   ┌─────────────────┐
//! │ AuthFlowHost │◀─────────────────────────│   TokenBroker   │
//! └──────────────┘                          └───┬─────────┬───┘
//!                                  load / save  │         │ valid token
//!                                               ▼         ▼
//!                                   ┌──────────────┐ ┌──────────────────────┐
//!                                   │ SessionStore │ │ GoogleCalendarClient │
//!                                   └──────────────┘ └──────────────────────┘
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod error;
pub mod google;

pub use error::{
    ProviderError, ProviderErrorCode, ProviderResult, REAUTH_REQUIRED_MESSAGE,
    UNAUTHENTICATED_MESSAGE,
};

/// A boxed future, used where async trait methods must stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
