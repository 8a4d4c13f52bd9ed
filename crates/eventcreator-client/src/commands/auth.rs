//! Sign-in commands.

use tracing::info;

use eventcreator_protocol::{Command, Payload};
use eventcreator_server::BackgroundHandle;

use super::finish;
use crate::error::ClientResult;

/// Runs the consent flow and stores the new session.
pub async fn login(handle: &BackgroundHandle, json: bool) -> ClientResult<()> {
    if !json {
        println!("Signing in to Google Calendar...");
    }

    let reply = handle.send(Command::Authenticate).await?;
    if finish(reply, json)?.is_some() {
        info!("sign-in complete");
        println!("Signed in. Your session has been saved.");
    }
    Ok(())
}

/// Forgets the stored session.
pub async fn logout(handle: &BackgroundHandle, json: bool) -> ClientResult<()> {
    let reply = handle.send(Command::Logout).await?;
    if finish(reply, json)?.is_some() {
        println!("Signed out.");
    }
    Ok(())
}

/// Reports whether a session is stored.
pub async fn status(handle: &BackgroundHandle, json: bool) -> ClientResult<()> {
    let reply = handle.send(Command::CheckAuth).await?;
    if let Some(Payload::Auth { authenticated }) = finish(reply, json)? {
        if authenticated {
            println!("Signed in.");
        } else {
            println!("Not signed in. Run `eventcreator auth login`.");
        }
    }
    Ok(())
}

/// Shows the redirect URI and client ID to register in the Cloud console.
pub async fn redirect_uri(handle: &BackgroundHandle, json: bool) -> ClientResult<()> {
    let reply = handle.send(Command::GetRedirectUri).await?;
    if let Some(Payload::RedirectUri {
        redirect_uri,
        client_id,
    }) = finish(reply, json)?
    {
        println!("redirect URI: {}", display_or_unset(&redirect_uri));
        println!("client ID:    {}", client_id);
    }
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() { "(not configured)" } else { value }
}
