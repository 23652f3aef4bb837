//! Versioned per-item records and wire types
//!
//! Each item in the working list owns two persisted records:
//!
//! - [`RemoteRecord`] - the last value+version known to be accepted by or
//!   received from the server. Absent entirely for a pure-local item that
//!   has never been synced.
//! - [`LocalRecord`] - the locally held state: the remote version the
//!   local edits are based on (`base_version`, the conflict-detection
//!   anchor), the record's own version counter (incremented on every
//!   edit), and the value itself. A `None` value is a tombstone.
//!
//! An item has pending changes exactly when `version > base_version`.
//!
//! The wire types mirror the sync endpoint contract: the client POSTs a
//! batch of [`SyncPayload`]s and receives the server's complete
//! [`AuthoritativeItem`] set back (never a delta).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DomainError;
use super::id::ItemId;

/// Last server-confirmed state for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Version the server holds for this item
    pub version: u64,
    /// Value the server holds, or `None` if the item has no confirmed
    /// remote content
    pub value: Option<Value>,
}

/// Locally held state for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Remote version the local edits are derived from
    pub base_version: u64,
    /// Local version counter, incremented on every edit
    pub version: u64,
    /// Locally held content; `None` means tombstoned / no local content
    pub value: Option<Value>,
}

impl LocalRecord {
    /// Create a record, enforcing `version >= base_version`
    ///
    /// # Errors
    /// Returns `DomainError::VersionBelowBase` when the invariant is
    /// violated.
    pub fn new(
        base_version: u64,
        version: u64,
        value: Option<Value>,
    ) -> Result<Self, DomainError> {
        if version < base_version {
            return Err(DomainError::VersionBelowBase {
                base_version,
                version,
            });
        }
        Ok(Self {
            base_version,
            version,
            value,
        })
    }

    /// A record for an item adopted verbatim from the server (no pending
    /// local content)
    #[must_use]
    pub fn from_remote_version(version: u64) -> Self {
        Self {
            base_version: version,
            version,
            value: None,
        }
    }

    /// Whether local edits exist that the server has not confirmed
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.version > self.base_version
    }

    /// Whether this record tombstones the item
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// Apply one local edit: bump the version and replace the value
    ///
    /// Passing `None` tombstones the item.
    #[must_use]
    pub fn edited(&self, value: Option<Value>) -> Self {
        Self {
            base_version: self.base_version,
            version: self.version + 1,
            value,
        }
    }
}

impl Default for LocalRecord {
    /// An empty, never-edited record (`base_version` 0, `version` 0, no
    /// value) - the state a freshly created item starts in
    fn default() -> Self {
        Self {
            base_version: 0,
            version: 0,
            value: None,
        }
    }
}

/// One entry of the batch the client submits on a sync attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Item id as this client knows it (may be a local id for creations)
    pub id: ItemId,
    /// Local version being proposed to the server
    pub version: u64,
    /// Proposed value; `None` requests deletion
    pub value: Option<Value>,
}

/// One entry of the server's authoritative response array
///
/// The server returns its complete current record set on every exchange.
/// When the server minted a permanent id for an item the client submitted
/// under a local id, `replaces` echoes the submitted id so the client can
/// rename its records; the field is absent from the wire otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoritativeItem {
    /// The server's id for this item
    pub id: ItemId,
    /// The server's current version
    pub version: u64,
    /// The server's current value
    pub value: Option<Value>,
    /// Client-submitted id this entry supersedes, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<ItemId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_record_invariant() {
        assert!(LocalRecord::new(3, 5, Some(json!("x"))).is_ok());
        assert!(LocalRecord::new(3, 3, None).is_ok());

        let err = LocalRecord::new(5, 3, None).unwrap_err();
        assert_eq!(
            err,
            DomainError::VersionBelowBase {
                base_version: 5,
                version: 3
            }
        );
    }

    #[test]
    fn test_default_is_empty() {
        let rec = LocalRecord::default();
        assert_eq!(rec.base_version, 0);
        assert_eq!(rec.version, 0);
        assert!(rec.is_tombstone());
        assert!(!rec.is_pending());
    }

    #[test]
    fn test_edited_bumps_version() {
        let rec = LocalRecord::default().edited(Some(json!("milk")));
        assert_eq!(rec.version, 1);
        assert_eq!(rec.base_version, 0);
        assert!(rec.is_pending());
        assert!(!rec.is_tombstone());
    }

    #[test]
    fn test_edited_none_tombstones() {
        let rec = LocalRecord::new(2, 3, Some(json!("x")))
            .unwrap()
            .edited(None);
        assert_eq!(rec.version, 4);
        assert!(rec.is_tombstone());
        assert!(rec.is_pending());
    }

    #[test]
    fn test_from_remote_version_not_pending() {
        let rec = LocalRecord::from_remote_version(9);
        assert_eq!(rec.base_version, 9);
        assert_eq!(rec.version, 9);
        assert!(!rec.is_pending());
    }

    #[test]
    fn test_authoritative_item_wire_shape() {
        let item = AuthoritativeItem {
            id: ItemId::new("r7".to_string()).unwrap(),
            version: 1,
            value: Some(json!("x")),
            replaces: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        // `replaces` must be absent from the wire when not set
        assert_eq!(json, json!({"id": "r7", "version": 1, "value": "x"}));
    }

    #[test]
    fn test_authoritative_item_replaces_roundtrip() {
        let wire = json!({
            "id": "r7",
            "version": 1,
            "value": "x",
            "replaces": "~0.abc"
        });
        let item: AuthoritativeItem = serde_json::from_value(wire).unwrap();
        assert_eq!(item.replaces.unwrap().as_str(), "~0.abc");
    }

    #[test]
    fn test_sync_payload_null_value() {
        let payload = SyncPayload {
            id: ItemId::new("r7".to_string()).unwrap(),
            version: 4,
            value: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, json!({"id": "r7", "version": 4, "value": null}));
    }
}
