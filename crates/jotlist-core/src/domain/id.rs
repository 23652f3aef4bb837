//! Item identifiers and the local/remote namespace split
//!
//! Every item is keyed by an opaque string id. Ids live in two disjoint
//! namespaces:
//!
//! - **remote ids** are assigned by the server and never start with `~`
//! - **local ids** are minted on this client as `~<seed>.<uuid>` for items
//!   the server has not confirmed yet
//!
//! The seed component records the version a re-minted id descends from
//! (an item demoted back to pending at logout keeps its edit history via
//! the seed); brand-new items use seed `0`. The uuid component guarantees
//! a fresh mint never collides with any live id, including an earlier
//! local id for the same conceptual item.
//!
//! Ids also derive the two durable store keys each item owns.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Prefix tagging the client-minted id namespace
const LOCAL_PREFIX: char = '~';

/// Store key prefix for the remote snapshot record
const REMOTE_KEY_PREFIX: &str = "item.remote.";

/// Store key prefix for the local record
const LOCAL_KEY_PREFIX: &str = "item.local.";

/// Store key holding the working list
pub const LIST_KEY: &str = "list";

/// Opaque item identifier
///
/// Validated to be non-empty and free of whitespace (ids are embedded in
/// store keys and wire payloads verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Create an ItemId from an existing string (e.g. a server-assigned id)
    ///
    /// # Errors
    /// Returns `DomainError::InvalidId` if the id is empty or contains
    /// whitespace.
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidId("id cannot be empty".to_string()));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidId(id));
        }
        Ok(Self(id))
    }

    /// Mint a fresh local id, guaranteed distinct from any live id
    ///
    /// `seed_version` records the version this id descends from when a
    /// server-linked item is demoted back to pending; `None` mints an id
    /// for a brand-new, never-synced item.
    #[must_use]
    pub fn mint_local(seed_version: Option<u64>) -> Self {
        let seed = seed_version.unwrap_or(0);
        Self(format!(
            "{LOCAL_PREFIX}{seed}.{}",
            Uuid::new_v4().simple()
        ))
    }

    /// Whether this id was minted locally (not yet confirmed by the server)
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    /// The seed version a local id was minted with, if any
    #[must_use]
    pub fn seed_version(&self) -> Option<u64> {
        let rest = self.0.strip_prefix(LOCAL_PREFIX)?;
        let (seed, _) = rest.split_once('.')?;
        seed.parse().ok()
    }

    /// Durable store key for this item's remote snapshot record
    #[must_use]
    pub fn remote_record_key(&self) -> String {
        format!("{REMOTE_KEY_PREFIX}{}", self.0)
    }

    /// Durable store key for this item's local record
    #[must_use]
    pub fn local_record_key(&self) -> String {
        format!("{LOCAL_KEY_PREFIX}{}", self.0)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ItemId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let id = ItemId::new("a1b2c3".to_string()).unwrap();
        assert_eq!(id.as_str(), "a1b2c3");
        assert!(!id.is_local());
    }

    #[test]
    fn test_empty_fails() {
        assert!(ItemId::new(String::new()).is_err());
    }

    #[test]
    fn test_whitespace_fails() {
        assert!(ItemId::new("a b".to_string()).is_err());
    }

    #[test]
    fn test_mint_local_is_local() {
        let id = ItemId::mint_local(None);
        assert!(id.is_local());
        assert_eq!(id.seed_version(), Some(0));
    }

    #[test]
    fn test_mint_local_unique() {
        let a = ItemId::mint_local(None);
        let b = ItemId::mint_local(None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_mint_local_seeded() {
        let id = ItemId::mint_local(Some(7));
        assert!(id.is_local());
        assert_eq!(id.seed_version(), Some(7));
    }

    #[test]
    fn test_remote_id_has_no_seed() {
        let id = ItemId::new("r42".to_string()).unwrap();
        assert_eq!(id.seed_version(), None);
    }

    #[test]
    fn test_store_keys_deterministic() {
        let id = ItemId::new("r42".to_string()).unwrap();
        assert_eq!(id.remote_record_key(), "item.remote.r42");
        assert_eq!(id.local_record_key(), "item.local.r42");

        let again = ItemId::new("r42".to_string()).unwrap();
        assert_eq!(id.remote_record_key(), again.remote_record_key());
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = ItemId::mint_local(Some(3));
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let result: Result<ItemId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
