use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};

use super::CredentialPair;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Persistent home of the credential pair.
///
/// Implementations are synchronous; the session calls them while holding
/// its own lock so a write and the in-memory update happen together.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<CredentialPair>>;
    fn save(&self, pair: &CredentialPair) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn load(&self) -> Result<Option<CredentialPair>> {
        (**self).load()
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        (**self).save(pair)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Stores the pair as `session.json` in the cache directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<CredentialPair>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let pair: CredentialPair =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(pair))
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(pair)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Keeps the pair in process memory only.
#[derive(Default)]
pub struct MemoryTokenStore {
    pair: Mutex<Option<CredentialPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<CredentialPair>>> {
        self.pair
            .lock()
            .map_err(|_| anyhow!("Token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<CredentialPair>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        *self.slot()? = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> CredentialPair {
        CredentialPair::new(access, refresh)
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().join("nested"));

        assert!(store.load().unwrap().is_none());

        store.save(&pair("A1", "R1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair("A1", "R1")));

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_none());

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_uses_token_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path());
        store.save(&pair("A1", "R1")).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["access_token"], "A1");
        assert_eq!(json["refresh_token"], "R1");
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse session file"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_pair(pair("A1", "R1"));
        assert_eq!(store.load().unwrap(), Some(pair("A1", "R1")));

        store.save(&pair("A2", "R1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair("A2", "R1")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
