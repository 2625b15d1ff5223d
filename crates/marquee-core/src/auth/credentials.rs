use anyhow::{Context, Result};
use keyring::Entry;

use super::{CredentialPair, TokenStore};

const SERVICE_NAME: &str = "marquee";

/// Keychain account used when none is given
const DEFAULT_ACCOUNT: &str = "session";

/// Stores the credential pair in the OS keychain as a JSON document.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new(account: &str) -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, account).context("Failed to create keyring entry")?;
        Ok(Self { entry })
    }

    pub fn with_default_account() -> Result<Self> {
        Self::new(DEFAULT_ACCOUNT)
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<CredentialPair>> {
        match self.entry.get_password() {
            Ok(secret) => {
                let pair = serde_json::from_str(&secret)
                    .context("Failed to parse session stored in keychain")?;
                Ok(Some(pair))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve session from keychain"),
        }
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        let secret = serde_json::to_string(pair)?;
        self.entry
            .set_password(&secret)
            .context("Failed to store session in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The mock keeps each secret on its entry, so every test works on one store.
    fn mock_store(account: &str) -> KeyringTokenStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringTokenStore::new(account).unwrap()
    }

    #[test]
    fn test_missing_entry_is_no_session() {
        let store = mock_store("empty");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = mock_store("roundtrip");
        let pair = CredentialPair::new("A1", "R1");
        store.save(&pair).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair));

        store.save(&CredentialPair::new("A2", "R1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(CredentialPair::new("A2", "R1")));
    }

    #[test]
    fn test_clear_tolerates_missing_entry() {
        let store = mock_store("clear");
        store.clear().unwrap();

        store.save(&CredentialPair::new("A1", "R1")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_unparseable_secret_is_an_error() {
        let store = mock_store("garbage");
        store.entry.set_password("not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse session"));
    }
}
