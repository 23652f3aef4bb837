//! Session transitions - login, logout, and the logout collapse
//!
//! Gaining a credential enables the scheduler (which triggers an
//! immediate attempt). Losing it - explicit logout or a server-side
//! rejection - disables the scheduler and detaches every item from its
//! server identity so nothing collides with stale server state if a new
//! session starts later.

use anyhow::Result;
use tracing::{debug, info};

use jotlist_core::domain::{ItemId, LocalRecord, WorkingList};
use jotlist_core::ports::Records;

use crate::engine::SyncEngine;
use crate::scheduler::SyncScheduler;
use std::sync::Arc;

/// Collapse every working-list item to a disconnected, purely local state
///
/// Per item:
/// - no local record, or nothing pending worth keeping (`version == 0` or
///   tombstoned) → records deleted, id dropped
/// - unsynced content and no remote snapshot ever existed → kept as-is
///   (already purely local)
/// - unsynced content *and* a remote snapshot → re-minted under a fresh
///   local id seeded with the local version, records rewritten with
///   `base_version` 0, old identity deleted; a future sync treats the
///   item as a brand-new creation
///
/// The resulting ids are deduplicated and sorted before the list is
/// persisted.
pub async fn collapse_to_local(records: &Records) -> Result<WorkingList> {
    let list = records.load_list().await?;
    let mut kept: Vec<ItemId> = Vec::new();

    for id in list.iter() {
        let local = records.local(id).await?;
        let remote = records.remote(id).await?;

        let pending = local
            .as_ref()
            .is_some_and(|l| l.version > 0 && l.value.is_some());

        if !pending {
            records.delete_item(id).await?;
            debug!(id = %id, "Dropped at logout (nothing to preserve)");
            continue;
        }

        if remote.is_none() {
            // Never linked to the server; already local
            kept.push(id.clone());
            continue;
        }

        // Detach from the prior server identity
        let local = local.unwrap_or_default();
        let new_id = ItemId::mint_local(Some(local.version));
        records
            .put_local(&new_id, &LocalRecord::new(0, local.version, local.value.clone())?)
            .await?;
        records.delete_item(id).await?;
        debug!(old = %id, new = %new_id, "Demoted to local id at logout");
        kept.push(new_id);
    }

    kept.sort();
    kept.dedup();
    let list = WorkingList::from_ids(kept)?;
    records.save_list(&list).await?;
    Ok(list)
}

/// Login/logout facade over the scheduler and engine
pub struct SessionManager {
    scheduler: SyncScheduler,
}

impl SessionManager {
    /// Creates a manager over a scheduler (and the engine it drives)
    pub fn new(scheduler: SyncScheduler) -> Self {
        Self { scheduler }
    }

    /// The engine, for item mutations and direct attempts
    pub fn engine(&self) -> &Arc<SyncEngine> {
        self.scheduler.engine()
    }

    /// The scheduler, for `op()`/`sync_now()` passthrough
    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    /// Begin a session: install the credential and start scheduling
    ///
    /// Enabling triggers an immediate sync attempt.
    pub fn login(&self, token: String) {
        info!("Session started");
        self.engine().set_token(Some(token));
        self.scheduler.enable();
    }

    /// End the session: stop scheduling and collapse items to local state
    pub async fn logout(&self) -> Result<()> {
        self.scheduler.disable();
        self.engine().end_session().await
    }
}
