//! OAuth 2.0 implicit grant for Google APIs.
//!
//! # Flow Overview
//!
//! 1. Ask the host for its redirect URI and check it is an extension redirect
//! 2. Build the authorization URL with `response_type=token`
//! 3. The host runs the interactive consent and hands back the final
//!    redirect URL
//! 4. Tokens (or the provider's error) are read from the URL fragment
//!
//! Expired access tokens are renewed through the token endpoint when a
//! refresh token was granted.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info};

use crate::BoxFuture;
use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleConfig;

const MISSING_TOKEN_MESSAGE: &str = "Failed to extract access token from response";

/// The environment that runs the interactive consent page.
///
/// A browser extension opens a web-auth popup; a terminal opens the system
/// browser and asks for the final URL. Tests script the answer.
pub trait AuthFlowHost: Send + Sync {
    /// The redirect URI registered for this installation.
    fn redirect_uri(&self) -> String;

    /// Shows `auth_url` to the user and resolves with the URL the provider
    /// redirected to. Dismissal should fail with
    /// [`ProviderError::user_cancelled`].
    fn launch_web_auth_flow(&self, auth_url: String) -> BoxFuture<'_, ProviderResult<String>>;
}

/// Tokens read from a successful authorization redirect.
#[derive(Clone, PartialEq, Eq)]
pub struct ImplicitGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, when the provider reported a parseable one.
    pub expires_in: Option<i64>,
}

impl std::fmt::Debug for ImplicitGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplicitGrant")
            .field("refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// A renewed access token.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// OAuth client for Google APIs.
#[derive(Debug)]
pub struct OAuthClient {
    client_id: String,
    scope: String,
    auth_url: String,
    token_url: String,
    redirect_host_suffix: String,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        let http_client = build_http_client(config.timeout, &config.user_agent)?;

        Ok(Self {
            client_id: config.client_id.clone(),
            scope: config.scope_param(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_host_suffix: config.redirect_host_suffix.clone(),
            http_client,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Checks that `redirect_uri` points at an extension redirect host.
    pub fn validate_redirect_uri(&self, redirect_uri: &str) -> ProviderResult<()> {
        let host_ok = url::Url::parse(redirect_uri)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
            .is_some_and(|host| host.ends_with(&self.redirect_host_suffix));

        if host_ok {
            Ok(())
        } else {
            Err(ProviderError::misconfigured_redirect(redirect_uri))
        }
    }

    /// Builds the Google OAuth authorization URL.
    pub fn build_auth_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=token&scope={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.scope),
        )
    }

    /// Runs the implicit grant through `host`.
    ///
    /// The redirect URI is validated before the host is asked to do anything.
    pub async fn authorize(&self, host: &dyn AuthFlowHost) -> ProviderResult<ImplicitGrant> {
        let redirect_uri = host.redirect_uri();
        self.validate_redirect_uri(&redirect_uri)?;

        let auth_url = self.build_auth_url(&redirect_uri);
        info!("starting OAuth flow");
        debug!("redirect URI: {}", redirect_uri);

        let response_url = host.launch_web_auth_flow(auth_url).await?;
        parse_implicit_grant(&response_url)
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<RefreshedToken> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(format!("token refresh request failed: {}", e))
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::api(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let refreshed: RefreshedToken = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })?;

        info!("refreshed access token");
        Ok(refreshed)
    }
}

/// Reads the grant out of the fragment of an authorization redirect.
///
/// A provider `error` becomes `"<error>: <error_description>"`; a denied
/// consent (`access_denied`) is reported as a user cancellation.
pub fn parse_implicit_grant(response_url: &str) -> ProviderResult<ImplicitGrant> {
    let fragment = url::Url::parse(response_url)
        .ok()
        .and_then(|url| url.fragment().map(str::to_string))
        .unwrap_or_default();

    let params: HashMap<String, String> = url::form_urlencoded::parse(fragment.as_bytes())
        .into_owned()
        .collect();

    if let Some(access_token) = params.get("access_token").filter(|t| !t.is_empty()) {
        return Ok(ImplicitGrant {
            access_token: access_token.clone(),
            refresh_token: params
                .get("refresh_token")
                .filter(|t| !t.is_empty())
                .cloned(),
            expires_in: params
                .get("expires_in")
                .and_then(|secs| secs.trim().parse().ok()),
        });
    }

    match params.get("error") {
        Some(error) => {
            let description = params
                .get("error_description")
                .map(String::as_str)
                .unwrap_or_default();
            let message = format!("{}: {}", error, description);
            if error == "access_denied" {
                Err(ProviderError::user_cancelled(message))
            } else {
                Err(ProviderError::api(message))
            }
        }
        None => Err(ProviderError::invalid_response(MISSING_TOKEN_MESSAGE)),
    }
}

pub(crate) fn build_http_client(
    timeout: Duration,
    user_agent: &str,
) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| {
            ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                .with_source(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
    const REDIRECT: &str = "https://abcdef.chromiumapp.org/";

    struct ScriptedHost {
        redirect_uri: String,
        response: Result<String, String>,
        launches: AtomicUsize,
    }

    impl ScriptedHost {
        fn new(redirect_uri: &str, response: Result<&str, &str>) -> Self {
            Self {
                redirect_uri: redirect_uri.to_string(),
                response: response.map(str::to_string).map_err(str::to_string),
                launches: AtomicUsize::new(0),
            }
        }
    }

    impl AuthFlowHost for ScriptedHost {
        fn redirect_uri(&self) -> String {
            self.redirect_uri.clone()
        }

        fn launch_web_auth_flow(&self, auth_url: String) -> BoxFuture<'_, ProviderResult<String>> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            assert!(auth_url.contains("response_type=token"));
            let response = self.response.clone();
            Box::pin(async move { response.map_err(ProviderError::user_cancelled) })
        }
    }

    fn client(token_url: &str) -> OAuthClient {
        OAuthClient::new(&GoogleConfig::new(CLIENT_ID).with_token_url(token_url)).unwrap()
    }

    #[test]
    fn auth_url_format() {
        let url = client(GoogleConfig::DEFAULT_TOKEN_URL).build_auth_url(REDIRECT);

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test-client.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fabcdef.chromiumapp.org%2F"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar"));
    }

    #[test]
    fn redirect_validation() {
        let client = client(GoogleConfig::DEFAULT_TOKEN_URL);
        assert!(client.validate_redirect_uri(REDIRECT).is_ok());
        assert!(
            client
                .validate_redirect_uri("https://abcdef.chromiumapp.org/callback")
                .is_ok()
        );

        for bad in [
            "",
            "not a url",
            "http://localhost:8080/",
            "https://evil.example/?.chromiumapp.org",
            "https://chromiumapp.org.evil.com/",
        ] {
            let err = client.validate_redirect_uri(bad).unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::MisconfiguredRedirect);
            assert!(err.message().contains(bad));
        }
    }

    #[test]
    fn parse_grant_success() {
        let grant = parse_implicit_grant(
            "https://abcdef.chromiumapp.org/#access_token=at&token_type=Bearer&expires_in=3599&scope=x",
        )
        .unwrap();
        assert_eq!(grant.access_token, "at");
        assert_eq!(grant.refresh_token, None);
        assert_eq!(grant.expires_in, Some(3599));

        let grant = parse_implicit_grant(
            "https://abcdef.chromiumapp.org/#access_token=at&refresh_token=rt&expires_in=soon",
        )
        .unwrap();
        assert_eq!(grant.refresh_token.as_deref(), Some("rt"));
        assert_eq!(grant.expires_in, None);
    }

    #[test]
    fn parse_grant_errors() {
        let err = parse_implicit_grant(
            "https://abcdef.chromiumapp.org/#error=access_denied&error_description=User+denied",
        )
        .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UserCancelled);
        assert_eq!(err.message(), "access_denied: User denied");

        let err =
            parse_implicit_grant("https://abcdef.chromiumapp.org/#error=invalid_scope").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Api);
        assert_eq!(err.message(), "invalid_scope: ");

        let err = parse_implicit_grant("https://abcdef.chromiumapp.org/").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert_eq!(err.message(), "Failed to extract access token from response");
    }

    #[tokio::test]
    async fn authorize_through_host() {
        let host = ScriptedHost::new(
            REDIRECT,
            Ok("https://abcdef.chromiumapp.org/#access_token=at&expires_in=60"),
        );
        let grant = client(GoogleConfig::DEFAULT_TOKEN_URL)
            .authorize(&host)
            .await
            .unwrap();
        assert_eq!(grant.access_token, "at");
        assert_eq!(host.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authorize_rejects_bad_redirect_before_launch() {
        let host = ScriptedHost::new("http://localhost/", Ok("unused"));
        let err = client(GoogleConfig::DEFAULT_TOKEN_URL)
            .authorize(&host)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MisconfiguredRedirect);
        assert_eq!(host.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn authorize_host_cancelled() {
        let host = ScriptedHost::new(REDIRECT, Err("The user did not approve access."));
        let err = client(GoogleConfig::DEFAULT_TOKEN_URL)
            .authorize(&host)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::UserCancelled);
        assert_eq!(err.message(), "The user did not approve access.");
    }

    #[tokio::test]
    async fn refresh_token_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refreshed = client(&format!("{}/token", server.uri()))
            .refresh_token("rt")
            .await
            .unwrap();
        assert_eq!(refreshed.access_token, "fresh");
        assert_eq!(refreshed.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn refresh_token_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        let err = client(&format!("{}/token", server.uri()))
            .refresh_token("rt")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Api);
    }
}
