//! Bearer credential storage
//!
//! The sync endpoint authenticates with a single opaque bearer token per
//! account. [`KeyringTokenStorage`] keeps it in the OS credential service;
//! [`MemoryTokenStorage`] backs tests and short-lived sessions.

use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Keyring service name for storing the sync credential
const KEYRING_SERVICE: &str = "jotlist";

/// Keyring username under which the token is filed
const KEYRING_USER: &str = "sync-token";

/// Port trait for bearer-credential persistence
pub trait TokenStorage: Send + Sync {
    /// Persist the token, replacing any existing one
    fn store(&self, token: &str) -> Result<()>;

    /// Load the stored token, or `None` if absent
    fn load(&self) -> Result<Option<String>>;

    /// Remove the stored token; removing an absent token is a no-op
    fn clear(&self) -> Result<()>;
}

/// Stores the sync token in the system keyring
///
/// Uses the `keyring` crate to file the credential with the OS secret
/// service rather than on disk.
pub struct KeyringTokenStorage;

impl KeyringTokenStorage {
    fn entry() -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .context("Failed to create keyring entry")
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn store(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keyring")?;
        debug!("Stored sync token in keyring");
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => {
                debug!("No sync token found in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) => {
                info!("Cleared sync token from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

/// In-process token storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Creates empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-loaded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn store(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
