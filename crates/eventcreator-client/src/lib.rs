//! CLI, configuration, terminal consent host and output rendering.
//!
//! This crate provides the `eventcreator` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use host::TerminalAuthHost;
