//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// eventcreator - publish events to Google Calendar
#[derive(Debug, Parser)]
#[command(name = "eventcreator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "EVENTCREATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Print raw result envelopes as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit log lines as JSON objects
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log filter directive, e.g. `eventcreator_providers=trace`
    #[arg(long, global = true, env = "EVENTCREATOR_LOG")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign-in commands
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// List calendars you can add events to
    Calendars,

    /// Show the event color palette
    Colors,

    /// Create an event
    Create(CreateArgs),

    /// Send a raw JSON command message and print the JSON reply
    Message {
        /// e.g. '{"action": "checkAuth"}'
        #[arg(id = "message_json", value_name = "JSON")]
        json: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sign-in actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Sign in with Google
    Login,

    /// Forget the stored session
    Logout,

    /// Report whether a session is stored
    Status,

    /// Show the redirect URI and client ID used for sign-in
    RedirectUri,
}

/// Arguments for `create`.
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Event title
    #[arg(long, short)]
    pub title: String,

    /// Start, RFC 3339 or local YYYY-MM-DDTHH:MM (default: now)
    #[arg(long, short)]
    pub start: Option<String>,

    /// End, RFC 3339 or local YYYY-MM-DDTHH:MM (default: start + duration)
    #[arg(long, short)]
    pub end: Option<String>,

    /// Event description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Dictated text, used as the description when none is given
    #[arg(long)]
    pub transcript: Option<String>,

    /// Target calendar ID
    #[arg(long)]
    pub calendar: Option<String>,

    /// Event color ID (1-11)
    #[arg(long)]
    pub color: Option<String>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
