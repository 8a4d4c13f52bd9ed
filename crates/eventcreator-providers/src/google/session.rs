//! Session persistence.
//!
//! A session is three fields stored and loaded as one unit. Stores do no
//! validation; expiry decisions belong to the token broker.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::BoxFuture;
use crate::error::{ProviderError, ProviderResult};

/// The persisted sign-in state.
///
/// On disk this is `{"accessToken": ..., "refreshToken": ..., "expiresAt": ...}`
/// with `expiresAt` in milliseconds since the Unix epoch.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Builds a session from a fresh grant. `expires_in` is in seconds.
    pub fn from_grant(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
            expires_at: expiry_after(now, expires_in),
        }
    }

    /// Returns the access token, if a non-empty one is stored.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// True when an access token is stored, expired or not.
    pub fn is_present(&self) -> bool {
        self.access_token().is_some()
    }

    /// An unknown expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Replaces the access token after a refresh, keeping the refresh token.
    pub fn apply_refresh(
        &mut self,
        access_token: impl Into<String>,
        expires_in: Option<i64>,
        now: DateTime<Utc>,
    ) {
        self.access_token = Some(access_token.into());
        self.expires_at = expiry_after(now, expires_in);
    }
}

/// `now + expires_in` seconds. An offset past the representable range
/// counts as unknown expiry.
fn expiry_after(now: DateTime<Utc>, expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    let offset = TimeDelta::try_seconds(expires_in?)?;
    now.checked_add_signed(offset)
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Persistent storage for a [`Session`].
pub trait SessionStore: Send + Sync {
    /// Loads the session; an empty [`Session`] when nothing is stored.
    fn load(&self) -> BoxFuture<'_, ProviderResult<Session>>;

    /// Replaces the stored session.
    fn save(&self, session: Session) -> BoxFuture<'_, ProviderResult<()>>;

    /// Removes the stored session.
    fn clear(&self) -> BoxFuture<'_, ProviderResult<()>>;
}

/// A JSON file holding the session, written atomically.
///
/// Saves through one store are serialized, so concurrent refreshes never
/// share a half-written temp file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> ProviderResult<Session> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no session file at {:?}", self.path);
                return Ok(Session::default());
            }
            Err(e) => {
                return Err(
                    ProviderError::storage(format!("failed to read session file: {}", e))
                        .with_source(e),
                );
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            ProviderError::storage(format!("failed to parse session file: {}", e)).with_source(e)
        })
    }

    async fn write(&self, session: &Session) -> ProviderResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ProviderError::storage(format!("failed to create session directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(session).map_err(|e| {
            ProviderError::storage(format!("failed to serialize session: {}", e))
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content).await.map_err(|e| {
            ProviderError::storage(format!("failed to write session file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&temp_path, perms)
                .await
                .map_err(|e| {
                    ProviderError::storage(format!("failed to restrict session file: {}", e))
                })?;
        }

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| ProviderError::storage(format!("failed to rename session file: {}", e)))?;

        debug!("saved session to {:?}", self.path);
        Ok(())
    }

    async fn remove(&self) -> ProviderResult<()> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("cleared session at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::storage(format!(
                "failed to remove session file: {}",
                e
            ))),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> BoxFuture<'_, ProviderResult<Session>> {
        Box::pin(self.read())
    }

    fn save(&self, session: Session) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move { self.write(&session).await })
    }

    fn clear(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(self.remove())
    }
}

/// An in-process store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> BoxFuture<'_, ProviderResult<Session>> {
        Box::pin(async move { Ok(self.session.read().await.clone()) })
    }

    fn save(&self, session: Session) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            *self.session.write().await = session;
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            *self.session.write().await = Session::default();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn session_from_grant() {
        let session = Session::from_grant("at", Some("rt".into()), Some(3600), now());
        assert_eq!(session.access_token(), Some("at"));
        assert_eq!(session.refresh_token(), Some("rt"));
        assert_eq!(
            session.expires_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap())
        );

        let session = Session::from_grant("at", None, None, now());
        assert!(session.expires_at.is_none());
        assert!(!session.is_expired_at(now() + Duration::days(365)));
    }

    #[test]
    fn session_expiry() {
        let session = Session::from_grant("at", None, Some(60), now());
        assert!(!session.is_expired_at(now()));
        assert!(session.is_expired_at(now() + Duration::seconds(60)));
    }

    #[test]
    fn out_of_range_expiry_is_unknown() {
        let session = Session::from_grant("at", None, Some(10_000_000_000_000), now());
        assert!(session.expires_at.is_none());
        assert!(!session.is_expired_at(now()));

        let mut session = Session::from_grant("at", Some("rt".into()), Some(60), now());
        session.apply_refresh("new", Some(i64::MAX), now());
        assert_eq!(session.access_token(), Some("new"));
        assert!(session.expires_at.is_none());

        // large but representable offsets are kept
        let session = Session::from_grant("at", None, Some(10_000_000_000), now());
        assert_eq!(
            session.expires_at,
            Some(now() + Duration::seconds(10_000_000_000))
        );
    }

    #[test]
    fn session_presence() {
        assert!(!Session::default().is_present());
        let empty = Session {
            access_token: Some(String::new()),
            ..Session::default()
        };
        assert!(!empty.is_present());
        assert!(Session::from_grant("at", None, None, now()).is_present());
    }

    #[test]
    fn session_refresh_keeps_refresh_token() {
        let mut session = Session::from_grant("old", Some("rt".into()), Some(60), now());
        let later = now() + Duration::hours(2);
        session.apply_refresh("new", Some(3600), later);
        assert_eq!(session.access_token(), Some("new"));
        assert_eq!(session.refresh_token(), Some("rt"));
        assert_eq!(session.expires_at, Some(later + Duration::hours(1)));
    }

    #[test]
    fn session_wire_format() {
        let session = Session::from_grant("at", None, Some(0), now());
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "accessToken": "at",
                "refreshToken": null,
                "expiresAt": now().timestamp_millis()
            })
        );

        let parsed: Session = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Session::default());
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = Session::from_grant("secret-at", Some("secret-rt".into()), None, now());
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().await.unwrap(), Session::default());

        let session = Session::from_grant("at", Some("rt".into()), Some(3600), now());
        store.save(session.clone()).await.unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().await.unwrap(), session);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load().await.unwrap(), Session::default());
        // clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn file_store_concurrent_saves_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));

        for round in 0..25 {
            let mut tasks = Vec::new();
            for i in 0..4 {
                let store = store.clone();
                let token = format!("at-{}-{}", round, i);
                tasks.push(tokio::spawn(async move {
                    store
                        .save(Session::from_grant(token, Some("rt".into()), Some(3600), now()))
                        .await
                }));
            }
            for task in tasks {
                task.await.unwrap().unwrap();
            }
        }

        let saved = store.load().await.unwrap();
        assert!(saved.access_token().is_some_and(|t| t.starts_with("at-24-")));
        assert_eq!(saved.refresh_token(), Some("rt"));
        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::new(&path).load().await.unwrap_err();
        assert_eq!(err.code(), crate::ProviderErrorCode::Storage);
    }

    #[tokio::test]
    async fn memory_store() {
        let store = MemorySessionStore::new();
        assert!(!store.load().await.unwrap().is_present());

        store
            .save(Session::from_grant("at", None, None, now()))
            .await
            .unwrap();
        assert!(store.load().await.unwrap().is_present());

        store.clear().await.unwrap();
        assert!(!store.load().await.unwrap().is_present());
    }
}
