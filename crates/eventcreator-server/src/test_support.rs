//! Shared fixtures for dispatcher and channel tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use eventcreator_providers::google::{AuthFlowHost, GoogleConfig, MemorySessionStore, Session};
use eventcreator_providers::{BoxFuture, ProviderError, ProviderResult};
use wiremock::MockServer;

use crate::Dispatcher;

pub const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
pub const REDIRECT_URI: &str = "https://abcdef.chromiumapp.org/";

/// A consent host that answers with a fixed redirect URL.
pub struct ScriptedHost {
    redirect_uri: String,
    response: Option<String>,
    pub launches: AtomicUsize,
}

impl ScriptedHost {
    fn build(redirect_uri: &str, response: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            redirect_uri: redirect_uri.to_string(),
            response: response.map(str::to_string),
            launches: AtomicUsize::new(0),
        })
    }

    /// A host whose consent page is always dismissed.
    pub fn idle() -> Arc<Self> {
        Self::build(REDIRECT_URI, None)
    }

    pub fn answering(response_url: &str) -> Arc<Self> {
        Self::build(REDIRECT_URI, Some(response_url))
    }

    pub fn with_redirect(redirect_uri: &str) -> Arc<Self> {
        Self::build(redirect_uri, None)
    }
}

impl AuthFlowHost for ScriptedHost {
    fn redirect_uri(&self) -> String {
        self.redirect_uri.clone()
    }

    fn launch_web_auth_flow(&self, _auth_url: String) -> BoxFuture<'_, ProviderResult<String>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.response
                .clone()
                .ok_or_else(|| ProviderError::user_cancelled("The user did not approve access."))
        })
    }
}

/// A session holding access token `"at"`.
pub fn session(refresh_token: Option<&str>, expires_at: Option<DateTime<Utc>>) -> Session {
    Session {
        access_token: Some("at".to_string()),
        refresh_token: refresh_token.map(str::to_string),
        expires_at,
    }
}

/// A dispatcher whose endpoints all point at `server`.
pub fn dispatcher(
    server: &MockServer,
    session: Session,
    host: Arc<ScriptedHost>,
) -> (Dispatcher, Arc<MemorySessionStore>) {
    let config = GoogleConfig::new(CLIENT_ID)
        .with_api_base(server.uri())
        .with_token_url(format!("{}/token", server.uri()))
        .with_timezone("UTC");
    let store = Arc::new(MemorySessionStore::with_session(session));
    let dispatcher = Dispatcher::from_config(&config, store.clone(), host).unwrap();
    (dispatcher, store)
}
