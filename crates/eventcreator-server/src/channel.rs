//! The background task and its request channel.
//!
//! Front ends hold a [`BackgroundHandle`]. Each request carries its own
//! oneshot reply slot, so every command gets exactly one envelope back.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use eventcreator_protocol::{Command, ResultEnvelope, decode_command, encode_envelope};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::Dispatcher;

/// Reply used when an envelope cannot be serialized.
const ENCODE_FAILURE_REPLY: &str = r#"{"success":false,"error":"failed to encode reply"}"#;

struct Request {
    command: Command,
    reply: oneshot::Sender<ResultEnvelope>,
}

/// Owns the dispatcher and serves commands until every handle is dropped.
pub struct Background {
    dispatcher: Arc<Dispatcher>,
    request_tx: mpsc::Sender<Request>,
    request_rx: mpsc::Receiver<Request>,
}

impl Background {
    pub fn new(dispatcher: Dispatcher, config: &ServerConfig) -> ServerResult<Self> {
        config.validate().map_err(ServerError::config)?;

        let (request_tx, request_rx) = mpsc::channel(config.channel_capacity);
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            request_tx,
            request_rx,
        })
    }

    /// Returns a handle for sending commands.
    pub fn handle(&self) -> BackgroundHandle {
        BackgroundHandle {
            request_tx: self.request_tx.clone(),
        }
    }

    /// Runs the service loop on a new task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Serves requests until all handles are gone.
    ///
    /// Commands run concurrently, so a pending sign-in does not hold up
    /// other requests.
    pub async fn run(self) {
        let Self {
            dispatcher,
            request_tx,
            mut request_rx,
        } = self;
        // only handles keep the channel open
        drop(request_tx);

        info!("background service started");
        while let Some(Request { command, reply }) = request_rx.recv().await {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let envelope = dispatcher.handle(command).await;
                if reply.send(envelope).is_err() {
                    debug!("requester went away before the reply");
                }
            });
        }
        info!("background service stopped");
    }
}

/// Sending side of the background channel.
#[derive(Clone, Debug)]
pub struct BackgroundHandle {
    request_tx: mpsc::Sender<Request>,
}

impl BackgroundHandle {
    /// Sends a command and waits for its reply.
    pub async fn send(&self, command: Command) -> ServerResult<ResultEnvelope> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request_tx
            .send(Request {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ServerError::ChannelClosed)?;

        reply_rx.await.map_err(|_| ServerError::ChannelClosed)
    }

    /// Raw JSON in, raw JSON out. Always answers with an envelope.
    pub async fn send_json(&self, message: &str) -> String {
        let envelope = match decode_command(message) {
            Ok(command) => match self.send(command).await {
                Ok(envelope) => envelope,
                Err(e) => ResultEnvelope::failure(e.to_string()),
            },
            Err(e) => {
                warn!("rejected message: {}", e);
                ResultEnvelope::failure(e.to_string())
            }
        };

        encode_envelope(&envelope).unwrap_or_else(|_| ENCODE_FAILURE_REPLY.to_string())
    }

    /// True once the background task has stopped.
    pub fn is_closed(&self) -> bool {
        self.request_tx.is_closed()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("action", &self.command.action())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedHost, dispatcher, session};
    use serde_json::{Value, json};
    use wiremock::MockServer;

    async fn running(server: &MockServer) -> (BackgroundHandle, JoinHandle<()>) {
        let (dispatcher, _) = dispatcher(server, session(None, None), ScriptedHost::idle());
        let background = Background::new(dispatcher, &ServerConfig::default()).unwrap();
        let handle = background.handle();
        (handle, background.spawn())
    }

    #[tokio::test]
    async fn send_returns_reply() {
        let server = MockServer::start().await;
        let (handle, _task) = running(&server).await;

        let reply = handle.send(Command::CheckAuth).await.unwrap();
        assert_eq!(reply, ResultEnvelope::authenticated(true));
    }

    #[tokio::test]
    async fn send_json_round_trip() {
        let server = MockServer::start().await;
        let (handle, _task) = running(&server).await;

        let reply = handle.send_json(r#"{"action": "logout"}"#).await;
        assert_eq!(reply, r#"{"success":true}"#);

        let reply: Value =
            serde_json::from_str(&handle.send_json(r#"{"action":"checkAuth"}"#).await).unwrap();
        assert_eq!(reply, json!({ "success": true, "authenticated": false }));
    }

    #[tokio::test]
    async fn send_json_rejects_bad_messages() {
        let server = MockServer::start().await;
        let (handle, _task) = running(&server).await;

        for message in ["", "{oops", r#"{"action": "launchRocket"}"#] {
            let reply: Value = serde_json::from_str(&handle.send_json(message).await).unwrap();
            assert_eq!(reply["success"], false);
            assert!(reply["error"].as_str().is_some_and(|e| !e.is_empty()));
        }
    }

    #[tokio::test]
    async fn concurrent_requests_each_get_one_reply() {
        let server = MockServer::start().await;
        let (handle, _task) = running(&server).await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.send(Command::GetRedirectUri).await.unwrap()
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_success());
        }
    }

    #[tokio::test]
    async fn stopped_service_reports_channel_closed() {
        let server = MockServer::start().await;
        let (handle, task) = running(&server).await;
        task.abort();
        let _ = task.await;

        assert!(handle.is_closed());
        assert!(matches!(
            handle.send(Command::CheckAuth).await,
            Err(ServerError::ChannelClosed)
        ));
        let reply: Value =
            serde_json::from_str(&handle.send_json(r#"{"action":"checkAuth"}"#).await).unwrap();
        assert_eq!(reply["error"], "Background service is not running");
    }

    #[tokio::test]
    async fn service_stops_when_handles_drop() {
        let server = MockServer::start().await;
        let (handle, task) = running(&server).await;
        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected() {
        let server = MockServer::start().await;
        let (dispatcher, _) = dispatcher(&server, Default::default(), ScriptedHost::idle());
        let config = ServerConfig::default().with_channel_capacity(0);
        assert!(matches!(
            Background::new(dispatcher, &config),
            Err(ServerError::Config { .. })
        ));
    }
}
