//! Access-token broker.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::oauth::{AuthFlowHost, OAuthClient};
use super::session::{Session, SessionStore};

/// Hands out valid access tokens.
///
/// Stored expiry is trusted as-is; the provider is never asked whether a
/// token is still good. A failed refresh always ends in a fresh sign-in.
pub struct TokenBroker {
    store: Arc<dyn SessionStore>,
    oauth: OAuthClient,
    host: Arc<dyn AuthFlowHost>,
}

impl TokenBroker {
    pub fn new(
        store: Arc<dyn SessionStore>,
        oauth: OAuthClient,
        host: Arc<dyn AuthFlowHost>,
    ) -> Self {
        Self { store, oauth, host }
    }

    pub fn client_id(&self) -> &str {
        self.oauth.client_id()
    }

    /// The redirect URI the host reports.
    pub fn redirect_uri(&self) -> String {
        self.host.redirect_uri()
    }

    /// Returns a usable access token, refreshing it once if it expired.
    pub async fn get_valid_access_token(&self) -> ProviderResult<String> {
        let mut session = self.store.load().await?;

        let Some(access_token) = session.access_token().map(str::to_string) else {
            return Err(ProviderError::unauthenticated());
        };

        let now = Utc::now();
        if !session.is_expired_at(now) {
            return Ok(access_token);
        }

        let Some(refresh_token) = session.refresh_token().map(str::to_string) else {
            debug!("access token expired and no refresh token stored");
            return Err(ProviderError::reauth_required());
        };

        info!("access token expired, refreshing");
        let refreshed = match self.oauth.refresh_token(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!("token refresh failed: {}", e);
                return Err(ProviderError::reauth_required());
            }
        };

        session.apply_refresh(&refreshed.access_token, refreshed.expires_in, Utc::now());
        self.store.save(session).await?;
        Ok(refreshed.access_token)
    }

    /// Runs the interactive sign-in and stores the new session.
    pub async fn login(&self) -> ProviderResult<String> {
        let grant = self.oauth.authorize(self.host.as_ref()).await?;

        let session = Session::from_grant(
            &grant.access_token,
            grant.refresh_token,
            grant.expires_in,
            Utc::now(),
        );
        self.store.save(session).await?;

        info!("signed in");
        Ok(grant.access_token)
    }

    /// Forgets the stored session.
    pub async fn logout(&self) -> ProviderResult<()> {
        self.store.clear().await?;
        info!("signed out");
        Ok(())
    }

    /// True when a session is stored, whether or not it has expired.
    pub async fn has_session(&self) -> ProviderResult<bool> {
        Ok(self.store.load().await?.is_present())
    }
}

impl std::fmt::Debug for TokenBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBroker")
            .field("oauth", &self.oauth)
            .finish_non_exhaustive()
    }
}
