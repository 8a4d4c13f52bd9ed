//! Google sign-in and Calendar API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by the token broker and the Calendar client.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth 2.0 client ID registered for the extension.
    pub client_id: String,

    /// OAuth scopes to request, joined with spaces in the authorization URL.
    pub scopes: Vec<String>,

    /// Authorization endpoint the consent flow is opened on.
    pub auth_url: String,

    /// Token endpoint used for refresh.
    pub token_url: String,

    /// Calendar API base, without a trailing slash.
    pub api_base: String,

    /// Host suffix a redirect URI must carry to be accepted.
    pub redirect_host_suffix: String,

    /// Where the session file lives.
    ///
    /// Defaults to `~/.local/share/eventcreator/session.json`.
    pub session_path: PathBuf,

    /// IANA zone stamped on created events. Uses the host zone when unset.
    pub timezone: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Read-write calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    pub const DEFAULT_AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    pub const DEFAULT_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Chrome extension redirect hosts look like `<extension-id>.chromiumapp.org`.
    pub const DEFAULT_REDIRECT_HOST_SUFFIX: &'static str = ".chromiumapp.org";

    /// Creates a configuration for the given client ID with Google's endpoints.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            auth_url: Self::DEFAULT_AUTH_URL.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            redirect_host_suffix: Self::DEFAULT_REDIRECT_HOST_SUFFIX.to_string(),
            session_path: Self::default_session_path(),
            timezone: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("eventcreator/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Returns the default session file path.
    pub fn default_session_path() -> PathBuf {
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventcreator")
            .join("session.json")
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the Calendar API base. A trailing slash is dropped.
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The scope parameter sent to the authorization endpoint.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required".to_string());
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com".to_string());
        }
        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }
        for (name, value) in [
            ("auth_url", &self.auth_url),
            ("token_url", &self.token_url),
            ("api_base", &self.api_base),
        ] {
            url::Url::parse(value).map_err(|e| format!("invalid {}: {}", name, e))?;
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new(CLIENT_ID);
        assert_eq!(config.scopes, vec![GoogleConfig::DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.scope_param(), "https://www.googleapis.com/auth/calendar");
        assert_eq!(config.api_base, "https://www.googleapis.com/calendar/v3");
        assert_eq!(config.redirect_host_suffix, ".chromiumapp.org");
        assert!(config.timezone.is_none());
        assert!(config.session_path.ends_with("eventcreator/session.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_validation() {
        assert!(GoogleConfig::new("").validate().is_err());
        assert!(GoogleConfig::new("bad-id").validate().is_err());
        assert!(
            GoogleConfig::new(CLIENT_ID)
                .with_scopes(vec![])
                .validate()
                .is_err()
        );
        assert!(
            GoogleConfig::new(CLIENT_ID)
                .with_token_url("not a url")
                .validate()
                .is_err()
        );
        assert!(
            GoogleConfig::new(CLIENT_ID)
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new(CLIENT_ID)
            .with_api_base("http://127.0.0.1:9000/")
            .with_token_url("http://127.0.0.1:9000/token")
            .with_session_path("/tmp/session.json")
            .with_timezone("Europe/Paris")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.token_url, "http://127.0.0.1:9000/token");
        assert_eq!(config.session_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.timezone.as_deref(), Some("Europe/Paris"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
