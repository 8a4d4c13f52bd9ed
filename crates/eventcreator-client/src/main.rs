//! eventcreator CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use eventcreator_client::cli::{AuthAction, Cli, Command, ConfigAction};
use eventcreator_client::commands;
use eventcreator_client::config::ClientConfig;
use eventcreator_client::error::{ClientError, ClientResult};
use eventcreator_client::host::TerminalAuthHost;
use eventcreator_core::{TracingConfig, TracingOutputFormat, init_tracing};
use eventcreator_providers::google::FileSessionStore;
use eventcreator_server::{Background, BackgroundHandle, Dispatcher, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(tracing_config(&cli)) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let (config, config_path) = load_config(cli.config.as_ref())?;

    let json = cli.json;
    // configuration commands never touch the session
    let background = || start_background(&config);

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
        Command::Auth { action } => {
            let handle = background()?;
            match action {
                AuthAction::Login => commands::auth::login(&handle, json).await,
                AuthAction::Logout => commands::auth::logout(&handle, json).await,
                AuthAction::Status => commands::auth::status(&handle, json).await,
                AuthAction::RedirectUri => commands::auth::redirect_uri(&handle, json).await,
            }
        }
        Command::Calendars => commands::event::calendars(&background()?, json).await,
        Command::Colors => commands::event::colors(&background()?, json).await,
        Command::Create(args) => {
            commands::event::create(&background()?, args, &config.defaults, json).await
        }
        Command::Message { json: message } => {
            println!("{}", background()?.send_json(&message).await);
            Ok(())
        }
    }
}

fn tracing_config(cli: &Cli) -> TracingConfig {
    let mut config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if cli.log_json {
        config = config.with_format(TracingOutputFormat::Json);
    }
    if let Some(ref filter) = cli.log_filter {
        config = config.with_env_filter(filter);
    }
    config
}

fn load_config(explicit: Option<&PathBuf>) -> ClientResult<(ClientConfig, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = ClientConfig::load_from(path).map_err(ClientError::Config)?;
            Ok((config, path.clone()))
        }
        None => {
            let config = ClientConfig::load().map_err(ClientError::Config)?;
            Ok((config, ClientConfig::default_path()))
        }
    }
}

/// Wires the session store, consent host and dispatcher, and starts the
/// background task.
fn start_background(config: &ClientConfig) -> ClientResult<BackgroundHandle> {
    let google = config
        .google
        .to_provider_config()
        .map_err(ClientError::Config)?;
    debug!(session = %google.session_path.display(), "using session file");

    let store = Arc::new(FileSessionStore::new(google.session_path.clone()));
    let host = Arc::new(TerminalAuthHost::new(config.google.redirect_uri()));
    let dispatcher = Dispatcher::from_config(&google, store, host)?;

    let background = Background::new(dispatcher, &ServerConfig::default())?;
    let handle = background.handle();
    background.spawn();
    Ok(handle)
}
