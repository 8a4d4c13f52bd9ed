//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, resolving secret references.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    if let Some(ref client_id) = config.google.client_id
        && secret::is_reference(client_id)
    {
        println!("google.client_id resolved from {}", client_id);
    }

    if config.google.redirect_uri.is_none() {
        println!("warning: google.redirect_uri is not set, sign-in will fail.");
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration and session file paths.
pub fn path(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("config:  {}", path.display());
    match config.google.session_path {
        Some(ref session) => println!("session: {}", session.display()),
        None => println!(
            "session: {}",
            eventcreator_providers::google::GoogleConfig::default_session_path().display()
        ),
    }
    Ok(())
}
