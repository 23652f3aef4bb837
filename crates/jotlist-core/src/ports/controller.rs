//! Item controller port
//!
//! Each item in the working list is driven through an opaque capability
//! interface: the reconciliation engine asks a controller to produce its
//! outgoing payload and, after an exchange, to merge one authoritative
//! record (or its absence). The engine never inspects item internals;
//! controllers report identity changes and removals through
//! [`MergeEffects`], which the engine applies to the working list and its
//! controller arena in one pass.

use anyhow::Result;

use crate::domain::id::ItemId;
use crate::domain::record::{AuthoritativeItem, SyncPayload};

/// What a merge did to the item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The item survives under its current id
    Kept,
    /// The item survives under a new id (old records transferred)
    Renamed,
    /// The item is gone; its records were deleted
    Removed,
}

/// Effects accumulated across one reconciliation pass
///
/// Mirrors the engine's bookkeeping: a set of ids to drop from the
/// working list and a sequence of ids to append. A rename is a removal
/// of the old id plus an addition of the new one.
#[derive(Debug, Default)]
pub struct MergeEffects {
    removed: Vec<ItemId>,
    added: Vec<ItemId>,
}

impl MergeEffects {
    /// Record that `id` left the working list
    pub fn removed(&mut self, id: ItemId) {
        if !self.removed.contains(&id) {
            self.removed.push(id);
        }
    }

    /// Record that `id` joined the working list
    pub fn added(&mut self, id: ItemId) {
        self.added.push(id);
    }

    /// Record an identity change: `old` is superseded by `new`
    pub fn moved(&mut self, old: ItemId, new: ItemId) {
        self.removed(old);
        self.added(new);
    }

    /// Ids dropped this pass
    pub fn removals(&self) -> &[ItemId] {
        &self.removed
    }

    /// Ids appended this pass
    pub fn additions(&self) -> &[ItemId] {
        &self.added
    }
}

/// Per-item payload/merge capability
///
/// The engine holds one controller per working-list id in an explicit
/// arena (insert on create/add, remove on rename/removal - entries are
/// never collected implicitly).
#[async_trait::async_trait]
pub trait ItemController: Send + Sync {
    /// Build this item's entry for the outgoing sync batch
    ///
    /// Returns `None` when nothing is pending and the item should be
    /// omitted from the batch.
    async fn produce_payload(&self) -> Result<Option<SyncPayload>>;

    /// Reconcile this item against the authoritative record the server
    /// returned for it, or against its absence (`None`) when the server
    /// no longer reports the item
    ///
    /// The controller decides the outcome (keep, adopt the server state,
    /// rename, or drop) and reports list-level consequences through
    /// `effects`.
    async fn merge(
        &self,
        remote: Option<&AuthoritativeItem>,
        effects: &mut MergeEffects,
    ) -> Result<MergeOutcome>;
}
