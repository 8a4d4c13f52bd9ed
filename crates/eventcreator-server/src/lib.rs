//! Background service for eventcreator.
//!
//! This crate provides:
//! - [`Dispatcher`], turning each [`Command`] into a [`ResultEnvelope`]
//! - [`Background`], a task that owns the dispatcher behind a bounded channel
//! - [`BackgroundHandle`], the sending side used by front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use eventcreator_server::{Background, Dispatcher, ServerConfig};
//!
//! let dispatcher = Dispatcher::from_config(&google_config, store, host)?;
//! let background = Background::new(dispatcher, &ServerConfig::default())?;
//! let handle = background.handle();
//! let _task = background.spawn();
//!
//! let reply = handle.send_json(r#"{"action": "checkAuth"}"#).await;
//! ```

mod channel;
mod config;
mod error;
mod handler;

pub use channel::{Background, BackgroundHandle};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use eventcreator_protocol::{Command, ResultEnvelope};
pub use handler::Dispatcher;

#[cfg(test)]
mod test_support;
