//! Default item controller and the controller arena
//!
//! [`VersionedItemController`] implements the `ItemController` port over
//! the two persisted records an item owns. The policy:
//!
//! - **payload**: submit only when local edits are pending
//!   (`version > base_version`); a tombstone for an item the server never
//!   held is omitted entirely.
//! - **merge, authoritative record present**: if the server's version
//!   still equals `base_version`, local state wins untouched. Otherwise
//!   the server record is adopted wholesale - except that local edits
//!   made after the submitted snapshot (local version strictly greater
//!   than the authoritative version) are rebased onto the new base
//!   instead of discarded. An authoritative record carrying a different
//!   id confirms a creation under its permanent form: records transfer to
//!   the new id and the old id's records are deleted.
//! - **merge, record absent**: a never-synced item with pending content
//!   is kept; everything else (server-deleted, or tombstoned with nothing
//!   to preserve) is dropped and its records deleted.
//!
//! [`ControllerArena`] is the explicit id->controller registry. Entries
//! are inserted when ids join the working list and removed on rename or
//! removal; nothing is collected implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use jotlist_core::domain::{AuthoritativeItem, ItemId, LocalRecord, RemoteRecord, SyncPayload};
use jotlist_core::ports::{ItemController, MergeEffects, MergeOutcome, Records};

/// Controller applying the whole-item versioned merge policy
pub struct VersionedItemController {
    id: ItemId,
    records: Records,
}

impl VersionedItemController {
    /// Creates a controller for `id` over the given record store
    pub fn new(id: ItemId, records: Records) -> Self {
        Self { id, records }
    }

    async fn merge_authoritative(
        &self,
        auth: &AuthoritativeItem,
        effects: &mut MergeEffects,
    ) -> Result<MergeOutcome> {
        let local = self.records.local(&self.id).await?.unwrap_or_default();
        let renamed = auth.id != self.id;

        if !renamed && auth.version == local.base_version {
            // Server unchanged since our base; pending local state stands
            return Ok(MergeOutcome::Kept);
        }

        let target = if renamed { &auth.id } else { &self.id };

        let new_local = if local.is_pending() && local.version > auth.version {
            // Edits landed after the snapshot the server confirmed; rebase
            // them so they go out on the next cycle
            LocalRecord::new(auth.version, local.version, local.value.clone())?
        } else {
            LocalRecord {
                base_version: auth.version,
                version: auth.version,
                value: auth.value.clone(),
            }
        };

        self.records
            .put_remote(
                target,
                &RemoteRecord {
                    version: auth.version,
                    value: auth.value.clone(),
                },
            )
            .await?;
        self.records.put_local(target, &new_local).await?;

        if renamed {
            self.records.delete_item(&self.id).await?;
            debug!(old = %self.id, new = %auth.id, "Item confirmed under permanent id");
            effects.moved(self.id.clone(), auth.id.clone());
            Ok(MergeOutcome::Renamed)
        } else {
            Ok(MergeOutcome::Kept)
        }
    }

    async fn merge_absent(&self, effects: &mut MergeEffects) -> Result<MergeOutcome> {
        let local = self.records.local(&self.id).await?;
        let remote = self.records.remote(&self.id).await?;

        let never_synced_with_content = remote.is_none()
            && local
                .as_ref()
                .is_some_and(|l| l.version > 0 && l.value.is_some());

        if never_synced_with_content {
            // Not yet known to the server; keep until a sync carries it up
            return Ok(MergeOutcome::Kept);
        }

        self.records.delete_item(&self.id).await?;
        debug!(id = %self.id, "Item dropped (deleted remotely or nothing to preserve)");
        effects.removed(self.id.clone());
        Ok(MergeOutcome::Removed)
    }
}

#[async_trait::async_trait]
impl ItemController for VersionedItemController {
    async fn produce_payload(&self) -> Result<Option<SyncPayload>> {
        let Some(local) = self.records.local(&self.id).await? else {
            return Ok(None);
        };
        if !local.is_pending() {
            return Ok(None);
        }
        if local.is_tombstone() && self.records.remote(&self.id).await?.is_none() {
            // Deleting an item the server never had: nothing to submit
            return Ok(None);
        }
        Ok(Some(SyncPayload {
            id: self.id.clone(),
            version: local.version,
            value: local.value,
        }))
    }

    async fn merge(
        &self,
        remote: Option<&AuthoritativeItem>,
        effects: &mut MergeEffects,
    ) -> Result<MergeOutcome> {
        match remote {
            Some(auth) => self.merge_authoritative(auth, effects).await,
            None => self.merge_absent(effects).await,
        }
    }
}

/// Explicit id->controller registry
///
/// The reconciliation engine resolves controllers through the arena and
/// applies rename/removal effects to it in the same pass that rewrites
/// the working list.
pub struct ControllerArena {
    entries: HashMap<ItemId, Arc<dyn ItemController>>,
    factory: Box<dyn Fn(ItemId) -> Arc<dyn ItemController> + Send + Sync>,
}

impl ControllerArena {
    /// Creates an arena that builds controllers with `factory`
    pub fn new(factory: impl Fn(ItemId) -> Arc<dyn ItemController> + Send + Sync + 'static) -> Self {
        Self {
            entries: HashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// An arena producing [`VersionedItemController`]s over `records`
    pub fn versioned(records: Records) -> Self {
        Self::new(move |id| {
            Arc::new(VersionedItemController::new(id, records.clone())) as Arc<dyn ItemController>
        })
    }

    /// The controller for `id`, inserting a fresh one if absent
    pub fn ensure(&mut self, id: &ItemId) -> Arc<dyn ItemController> {
        self.entries
            .entry(id.clone())
            .or_insert_with(|| (self.factory)(id.clone()))
            .clone()
    }

    /// Insert a controller for `id` (no-op if present)
    pub fn insert(&mut self, id: ItemId) {
        self.ensure(&id);
    }

    /// Remove the controller for `id`
    pub fn remove(&mut self, id: &ItemId) {
        self.entries.remove(id);
    }

    /// Drop every entry and rebuild for exactly the given ids
    pub fn reset<'a>(&mut self, ids: impl Iterator<Item = &'a ItemId>) {
        self.entries.clear();
        for id in ids {
            self.insert(id.clone());
        }
    }

    /// Number of live controllers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jotlist_store::MemoryItemStore;
    use serde_json::json;

    fn records() -> Records {
        Records::new(Arc::new(MemoryItemStore::new()))
    }

    fn id(s: &str) -> ItemId {
        ItemId::new(s.to_string()).unwrap()
    }

    fn auth(i: &str, version: u64, value: &str, replaces: Option<&str>) -> AuthoritativeItem {
        AuthoritativeItem {
            id: id(i),
            version,
            value: Some(json!(value)),
            replaces: replaces.map(id),
        }
    }

    #[tokio::test]
    async fn test_payload_omitted_when_nothing_pending() {
        let records = records();
        let item = id("r1");
        records
            .put_local(&item, &LocalRecord::from_remote_version(4))
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item, records);
        assert!(ctrl.produce_payload().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payload_carries_pending_edit() {
        let records = records();
        let item = id("r1");
        records
            .put_local(&item, &LocalRecord::new(4, 6, Some(json!("x"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item.clone(), records);
        let payload = ctrl.produce_payload().await.unwrap().unwrap();
        assert_eq!(payload.id, item);
        assert_eq!(payload.version, 6);
        assert_eq!(payload.value, Some(json!("x")));
    }

    #[tokio::test]
    async fn test_payload_skips_tombstone_of_never_synced_item() {
        let records = records();
        let item = ItemId::mint_local(None);
        records
            .put_local(&item, &LocalRecord::new(0, 2, None).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item, records);
        assert!(ctrl.produce_payload().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payload_submits_tombstone_of_synced_item() {
        let records = records();
        let item = id("r1");
        records
            .put_remote(&item, &RemoteRecord { version: 3, value: Some(json!("x")) })
            .await
            .unwrap();
        records
            .put_local(&item, &LocalRecord::new(3, 4, None).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item, records);
        let payload = ctrl.produce_payload().await.unwrap().unwrap();
        assert_eq!(payload.version, 4);
        assert!(payload.value.is_none());
    }

    #[tokio::test]
    async fn test_merge_local_wins_when_server_at_base() {
        let records = records();
        let item = id("r1");
        records
            .put_remote(&item, &RemoteRecord { version: 3, value: Some(json!("old")) })
            .await
            .unwrap();
        records
            .put_local(&item, &LocalRecord::new(3, 5, Some(json!("edited"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item.clone(), records.clone());
        let mut effects = MergeEffects::default();
        let outcome = ctrl
            .merge(Some(&auth("r1", 3, "old", None)), &mut effects)
            .await
            .unwrap();

        assert_eq!(outcome, MergeOutcome::Kept);
        let local = records.local(&item).await.unwrap().unwrap();
        assert_eq!(local.version, 5);
        assert_eq!(local.value, Some(json!("edited")));
        assert!(effects.removals().is_empty());
    }

    #[tokio::test]
    async fn test_merge_server_wins_on_divergence() {
        let records = records();
        let item = id("r1");
        records
            .put_remote(&item, &RemoteRecord { version: 3, value: Some(json!("old")) })
            .await
            .unwrap();
        records
            .put_local(&item, &LocalRecord::new(3, 5, Some(json!("mine"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item.clone(), records.clone());
        let mut effects = MergeEffects::default();
        ctrl.merge(Some(&auth("r1", 7, "theirs", None)), &mut effects)
            .await
            .unwrap();

        let local = records.local(&item).await.unwrap().unwrap();
        assert_eq!(local.base_version, 7);
        assert_eq!(local.version, 7);
        assert_eq!(local.value, Some(json!("theirs")));
        assert!(!local.is_pending());

        let remote = records.remote(&item).await.unwrap().unwrap();
        assert_eq!(remote.version, 7);
    }

    #[tokio::test]
    async fn test_merge_confirmation_clears_pending() {
        let records = records();
        let item = id("r1");
        records
            .put_remote(&item, &RemoteRecord { version: 3, value: Some(json!("old")) })
            .await
            .unwrap();
        records
            .put_local(&item, &LocalRecord::new(3, 5, Some(json!("mine"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item.clone(), records.clone());
        let mut effects = MergeEffects::default();
        // server confirmed exactly the version we submitted
        ctrl.merge(Some(&auth("r1", 5, "mine", None)), &mut effects)
            .await
            .unwrap();

        let local = records.local(&item).await.unwrap().unwrap();
        assert_eq!(local.base_version, 5);
        assert!(!local.is_pending());
    }

    #[tokio::test]
    async fn test_merge_rebases_edits_made_during_flight() {
        let records = records();
        let item = id("r1");
        // submitted version 5, but the user kept typing: local is now 6
        records
            .put_local(&item, &LocalRecord::new(3, 6, Some(json!("newer"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item.clone(), records.clone());
        let mut effects = MergeEffects::default();
        ctrl.merge(Some(&auth("r1", 5, "mine", None)), &mut effects)
            .await
            .unwrap();

        let local = records.local(&item).await.unwrap().unwrap();
        assert_eq!(local.base_version, 5);
        assert_eq!(local.version, 6);
        assert_eq!(local.value, Some(json!("newer")));
        assert!(local.is_pending());
    }

    #[tokio::test]
    async fn test_merge_rename_transfers_records() {
        let records = records();
        let local_id = ItemId::mint_local(None);
        records
            .put_local(&local_id, &LocalRecord::new(0, 1, Some(json!("x"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(local_id.clone(), records.clone());
        let mut effects = MergeEffects::default();
        let confirmed = AuthoritativeItem {
            id: id("r7"),
            version: 1,
            value: Some(json!("x")),
            replaces: Some(local_id.clone()),
        };
        let outcome = ctrl.merge(Some(&confirmed), &mut effects).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Renamed);
        assert_eq!(effects.removals(), &[local_id.clone()]);
        assert_eq!(effects.additions(), &[id("r7")]);

        // old records are gone, new ones exist under the permanent id
        assert!(records.local(&local_id).await.unwrap().is_none());
        assert!(records.remote(&local_id).await.unwrap().is_none());
        let local = records.local(&id("r7")).await.unwrap().unwrap();
        assert_eq!(local.base_version, 1);
        assert_eq!(local.version, 1);
        let remote = records.remote(&id("r7")).await.unwrap().unwrap();
        assert_eq!(remote.version, 1);
        assert_eq!(remote.value, Some(json!("x")));
    }

    #[tokio::test]
    async fn test_merge_absent_keeps_never_synced_pending_item() {
        let records = records();
        let local_id = ItemId::mint_local(None);
        records
            .put_local(&local_id, &LocalRecord::new(0, 1, Some(json!("draft"))).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(local_id.clone(), records.clone());
        let mut effects = MergeEffects::default();
        let outcome = ctrl.merge(None, &mut effects).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Kept);
        assert!(records.local(&local_id).await.unwrap().is_some());
        assert!(effects.removals().is_empty());
    }

    #[tokio::test]
    async fn test_merge_absent_drops_remotely_deleted_item() {
        let records = records();
        let item = id("r1");
        records
            .put_remote(&item, &RemoteRecord { version: 3, value: Some(json!("x")) })
            .await
            .unwrap();
        records
            .put_local(&item, &LocalRecord::from_remote_version(3))
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(item.clone(), records.clone());
        let mut effects = MergeEffects::default();
        let outcome = ctrl.merge(None, &mut effects).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Removed);
        assert_eq!(effects.removals(), &[item.clone()]);
        assert!(records.local(&item).await.unwrap().is_none());
        assert!(records.remote(&item).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_absent_drops_tombstoned_local_item() {
        let records = records();
        let local_id = ItemId::mint_local(None);
        records
            .put_local(&local_id, &LocalRecord::new(0, 2, None).unwrap())
            .await
            .unwrap();

        let ctrl = VersionedItemController::new(local_id.clone(), records.clone());
        let mut effects = MergeEffects::default();
        let outcome = ctrl.merge(None, &mut effects).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Removed);
        assert!(records.local(&local_id).await.unwrap().is_none());
    }

    #[test]
    fn test_arena_insert_remove_reset() {
        let records = records();
        let mut arena = ControllerArena::versioned(records);

        arena.insert(id("a"));
        arena.insert(id("a"));
        arena.insert(id("b"));
        assert_eq!(arena.len(), 2);

        arena.remove(&id("a"));
        assert_eq!(arena.len(), 1);

        let ids = vec![id("x"), id("y"), id("z")];
        arena.reset(ids.iter());
        assert_eq!(arena.len(), 3);
    }
}
