use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

use super::{MemoryTokenStore, TokenStore};

/// Access and refresh tokens issued at login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(rename = "access_token")]
    pub access: String,
    #[serde(rename = "refresh_token")]
    pub refresh: String,
}

impl CredentialPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens never end up in logs
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// The credential pair shared by every request made through one transport.
///
/// Writes hit the backing store first and the in-memory copy second, under
/// the same lock, so a request issued after a write always sees the new
/// tokens. The refresh lock serializes token renewal across concurrent
/// requests.
pub struct Session {
    store: Box<dyn TokenStore>,
    tokens: RwLock<Option<CredentialPair>>,
    refresh_lock: Mutex<()>,
}

impl Session {
    /// Create an empty session backed by `store`. Call [`Session::load`]
    /// to pick up previously persisted tokens.
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryTokenStore::new()))
    }

    /// Create a session and immediately load it from `store`.
    pub async fn restore(store: Box<dyn TokenStore>) -> Result<Self> {
        let session = Self::new(store);
        session.load().await?;
        Ok(session)
    }

    /// Load tokens from the backing store. Returns whether any were found.
    pub async fn load(&self) -> Result<bool> {
        let loaded = self.store.load()?;
        let found = loaded.is_some();
        *self.tokens.write().await = loaded;
        debug!(found, "Session loaded from store");
        Ok(found)
    }

    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.tokens.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.access.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.refresh.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Replace both tokens, as after a successful login.
    pub async fn store_credentials(&self, pair: CredentialPair) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        self.store.save(&pair)?;
        *tokens = Some(pair);
        Ok(())
    }

    /// Replace the access token and keep the refresh token.
    pub async fn update_access(&self, access: String) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        let refresh = tokens
            .as_ref()
            .map(|t| t.refresh.clone())
            .ok_or_else(|| anyhow!("No session to update"))?;
        let updated = CredentialPair { access, refresh };
        self.store.save(&updated)?;
        *tokens = Some(updated);
        Ok(())
    }

    /// Forget both tokens, in memory and in the backing store.
    pub async fn clear(&self) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        *tokens = None;
        self.store.clear()
    }

    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::FileTokenStore;

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = CredentialPair::new("secret-access", "secret-refresh");
        let printed = format!("{:?}", pair);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("redacted"));
    }

    #[tokio::test]
    async fn test_login_refresh_logout_lifecycle() {
        let backing = Arc::new(MemoryTokenStore::new());
        let session = Session::new(Box::new(Arc::clone(&backing)));
        assert!(!session.is_authenticated().await);
        assert_eq!(session.access_token().await, None);

        session
            .store_credentials(CredentialPair::new("A1", "R1"))
            .await
            .unwrap();
        assert_eq!(session.access_token().await.as_deref(), Some("A1"));
        assert_eq!(backing.load().unwrap(), Some(CredentialPair::new("A1", "R1")));

        session.update_access("A2".to_string()).await.unwrap();
        assert_eq!(session.access_token().await.as_deref(), Some("A2"));
        assert_eq!(session.refresh_token().await.as_deref(), Some("R1"));
        assert_eq!(backing.load().unwrap(), Some(CredentialPair::new("A2", "R1")));

        session.clear().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(backing.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_access_without_session_fails() {
        let session = Session::in_memory();
        assert!(session.update_access("A2".to_string()).await.is_err());
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_restore_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path());
        store.save(&CredentialPair::new("A1", "R1")).unwrap();

        let session = Session::restore(Box::new(FileTokenStore::new(dir.path())))
            .await
            .unwrap();
        assert_eq!(
            session.credentials().await,
            Some(CredentialPair::new("A1", "R1"))
        );
    }
}
