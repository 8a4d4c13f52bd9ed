//! Client configuration.
//!
//! All settings live in one `config.toml`, by default at
//! `~/.config/eventcreator/config.toml`:
//!
//! ```toml
//! [google]
//! client_id = "env::EVENTCREATOR_CLIENT_ID"
//! redirect_uri = "https://<extension-id>.chromiumapp.org/"
//!
//! [defaults]
//! calendar_id = "primary"
//! duration_minutes = 30
//! ```
//!
//! `client_id` supports secret references (`pass::…`, `env::…`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use eventcreator_core::time::DEFAULT_EVENT_MINUTES;
use eventcreator_providers::google::GoogleConfig;

/// Configuration for the eventcreator client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google sign-in and API settings.
    pub google: GoogleSettings,

    /// Defaults applied to new events.
    pub defaults: EventDefaults,
}

/// Google settings from the `[google]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// Redirect URI registered for the client, a `*.chromiumapp.org` URL.
    pub redirect_uri: Option<String>,

    /// Where the session is stored.
    pub session_path: Option<PathBuf>,

    /// IANA zone stamped on events, host zone when unset.
    pub timezone: Option<String>,

    /// HTTP request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Endpoint overrides, for testing against a stub server.
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub api_base: Option<String>,
}

/// Event defaults from the `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDefaults {
    pub calendar_id: Option<String>,
    pub color_id: Option<String>,
    /// Event length when no end is given.
    pub duration_minutes: i64,
}

impl Default for EventDefaults {
    fn default() -> Self {
        Self {
            calendar_id: None,
            color_id: None,
            duration_minutes: DEFAULT_EVENT_MINUTES,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventcreator")
            .join("config.toml")
    }

    /// Checks everything a run would need, resolving secret references.
    pub fn validate(&self) -> Result<(), String> {
        if self.defaults.duration_minutes <= 0 {
            return Err("defaults.duration_minutes must be positive".to_string());
        }
        self.google.to_provider_config()?.validate()
    }
}

impl GoogleSettings {
    /// Resolves the client ID, expanding `pass::` / `env::` references.
    pub fn resolve_client_id(&self) -> Result<String, String> {
        let raw = self.client_id.as_deref().ok_or_else(|| {
            format!(
                "Google client_id not found. Add to {}:\n  \
                 [google]\n  \
                 client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                 redirect_uri = \"https://YOUR_EXTENSION_ID.chromiumapp.org/\"",
                ClientConfig::default_path().display()
            )
        })?;

        crate::secret::resolve(raw).map_err(|e| format!("failed to resolve client_id: {}", e))
    }

    /// The redirect URI handed to the sign-in flow; empty when unset.
    pub fn redirect_uri(&self) -> String {
        self.redirect_uri.clone().unwrap_or_default()
    }

    /// Builds the provider configuration.
    pub fn to_provider_config(&self) -> Result<GoogleConfig, String> {
        let mut config = GoogleConfig::new(self.resolve_client_id()?);

        if let Some(ref path) = self.session_path {
            config = config.with_session_path(path);
        }
        if let Some(ref timezone) = self.timezone {
            config = config.with_timezone(timezone);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ref url) = self.auth_url {
            config = config.with_auth_url(url);
        }
        if let Some(ref url) = self.token_url {
            config = config.with_token_url(url);
        }
        if let Some(ref url) = self.api_base {
            config = config.with_api_base(url);
        }

        Ok(config)
    }
}
