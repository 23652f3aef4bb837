//! Sync engine - attempts, reconciliation, and user mutations
//!
//! One attempt is one network round-trip: snapshot the payload batch,
//! exchange it for the server's complete authoritative set, then fold
//! that set into local state. The engine guarantees:
//!
//! - at most one attempt in flight (the `syncing` flag is checked and set
//!   before the exchange starts)
//! - a minimum interval between attempts (hard rate guard, independent of
//!   scheduling)
//! - a failed cycle never mutates persisted state; worst case is
//!   staleness until the next successful attempt
//! - results are discarded if scheduling was disabled while the exchange
//!   was in flight
//!
//! Mutations made while an attempt is in flight are not lost: the batch
//! is snapshotted at attempt start, so they ride the next cycle.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use jotlist_core::config::Config;
use jotlist_core::domain::{
    AuthoritativeItem, ItemId, ListOrder, LocalRecord, RemoteRecord, WorkingList,
};
use jotlist_core::ports::{
    ItemStore, MergeEffects, Notifier, Records, StatusSink, SyncTransport, TransportError,
    UserNotice,
};

use crate::controller::ControllerArena;
use crate::scheduler::SchedulerHandle;
use crate::session::collapse_to_local;

/// How a sync attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Reconciliation was applied and reported as a success
    Completed,
    /// No credential is present; scheduling was stopped
    NoCredential,
    /// Refused by the client-side rate guard or the server (429)
    RateLimited,
    /// Another attempt was already in flight
    Busy,
    /// The server no longer recognizes the credential; the session ended
    AuthInvalid,
    /// Transport or parse failure; reported silently as a cycle failure
    Failed,
    /// Scheduling was disabled during the exchange; results discarded
    Discarded,
}

/// Reconciliation engine with injected dependencies
///
/// ## Dependencies
///
/// - `store` / `records`: durable key->JSON persistence
/// - `transport`: the network exchange
/// - `status`: last-sync tracking and the in-flight flag
/// - `notifier`: transient user notices
/// - `handle`: shared scheduler state (enabled flag, deadlines)
pub struct SyncEngine {
    records: Records,
    transport: Arc<dyn SyncTransport>,
    status: Arc<dyn StatusSink>,
    notifier: Arc<dyn Notifier>,
    handle: SchedulerHandle,
    controllers: Mutex<ControllerArena>,
    token: RwLock<Option<String>>,
    max_list_len: usize,
    min_sync_interval: Duration,
    order: ListOrder,
}

impl SyncEngine {
    /// Creates an engine over the given collaborators
    ///
    /// `handle` must be shared with the scheduler that drives this engine
    /// so both observe one `enabled` flag.
    pub fn new(
        store: Arc<dyn ItemStore>,
        transport: Arc<dyn SyncTransport>,
        status: Arc<dyn StatusSink>,
        notifier: Arc<dyn Notifier>,
        handle: SchedulerHandle,
        config: &Config,
    ) -> Self {
        let records = Records::new(store);
        Self {
            controllers: Mutex::new(ControllerArena::versioned(records.clone())),
            records,
            transport,
            status,
            notifier,
            handle,
            token: RwLock::new(None),
            max_list_len: config.list.max_len,
            min_sync_interval: config.sync.min_sync_interval(),
            order: config.list.order,
        }
    }

    /// Install or clear the session credential
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    /// Whether a session credential is present
    pub fn has_token(&self) -> bool {
        self.token.read().unwrap().is_some()
    }

    /// Typed record access (shared with controllers)
    pub fn records(&self) -> &Records {
        &self.records
    }

    // ========================================================================
    // User mutations
    // ========================================================================

    /// Create a new item with an optional initial value
    ///
    /// Mints a local id, persists its record, appends it to the working
    /// list, and signals the scheduler.
    pub async fn create_item(&self, value: Option<serde_json::Value>) -> Result<ItemId> {
        let id = ItemId::mint_local(None);
        let record = match value {
            Some(v) => LocalRecord::default().edited(Some(v)),
            None => LocalRecord::default(),
        };
        self.records.put_local(&id, &record).await?;

        let mut list = self.records.load_list().await?;
        list.push(id.clone())?;
        self.records.save_list(&list).await?;
        self.controllers.lock().await.insert(id.clone());

        if list.exceeds_cap(self.max_list_len) {
            warn!(len = list.len(), cap = self.max_list_len, "Working list exceeds soft cap");
            self.notifier.set_notice(Some(UserNotice::ListOverlength));
        }

        self.handle.op();
        info!(id = %id, "Created item");
        Ok(id)
    }

    /// Replace an item's value, bumping its local version
    ///
    /// Passing `None` tombstones the item; the deletion is carried to the
    /// server on the next cycle.
    pub async fn update_item(&self, id: &ItemId, value: Option<serde_json::Value>) -> Result<()> {
        let list = self.records.load_list().await?;
        if !list.contains(id) {
            bail!("unknown item: {id}");
        }
        let current = self.records.local(id).await?.unwrap_or_default();
        self.records.put_local(id, &current.edited(value)).await?;
        self.handle.op();
        debug!(id = %id, "Updated item");
        Ok(())
    }

    /// The working list with each item's local record, for display
    pub async fn items(&self) -> Result<Vec<(ItemId, LocalRecord)>> {
        let list = self.records.load_list().await?;
        let mut items = Vec::with_capacity(list.len());
        for id in list.iter() {
            let record = self.records.local(id).await?.unwrap_or_default();
            items.push((id.clone(), record));
        }
        Ok(items)
    }

    // ========================================================================
    // Sync attempt
    // ========================================================================

    /// Perform one sync attempt
    ///
    /// Checks the credential, the rate guard, and the in-flight flag, in
    /// that order; then runs the exchange-and-reconcile cycle.
    pub async fn attempt(&self) -> Result<SyncOutcome> {
        let token = match self.token.read().unwrap().clone() {
            Some(token) => token,
            None => {
                debug!("No credential; stopping scheduler");
                self.handle.disable();
                return Ok(SyncOutcome::NoCredential);
            }
        };

        if let Some(last) = self.status.last_sync_instant() {
            if Instant::now() < last + self.min_sync_interval {
                debug!("Attempt refused by rate guard");
                self.notifier.set_notice(Some(UserNotice::SyncRateLimited));
                return Ok(SyncOutcome::RateLimited);
            }
        }

        if self.status.is_syncing() {
            debug!("Attempt skipped: another attempt is in flight");
            return Ok(SyncOutcome::Busy);
        }

        self.status.set_syncing(true);
        let result = self.run_cycle(&token).await;
        self.status.set_syncing(false);

        if let Ok(outcome) = &result {
            debug!(outcome = ?outcome, "Sync attempt finished");
        }
        result
    }

    /// One exchange-and-reconcile cycle
    async fn run_cycle(&self, token: &str) -> Result<SyncOutcome> {
        let list = self.records.load_list().await?;

        if list.exceeds_cap(self.max_list_len) {
            warn!(len = list.len(), cap = self.max_list_len, "Working list exceeds soft cap");
            self.notifier.set_notice(Some(UserNotice::ListOverlength));
        }

        // Snapshot the batch at attempt start; edits made during the
        // exchange ride the next cycle
        let mut batch = Vec::new();
        {
            let mut arena = self.controllers.lock().await;
            for id in list.capped(self.max_list_len) {
                let controller = arena.ensure(id);
                if let Some(payload) = controller
                    .produce_payload()
                    .await
                    .with_context(|| format!("payload for {id}"))?
                {
                    batch.push(payload);
                }
            }
        }

        info!(items = batch.len(), "Starting sync exchange");

        let remote = match self.transport.exchange(token, &batch).await {
            Ok(items) => items,
            Err(TransportError::AuthInvalid) => {
                warn!("Credential rejected; ending session");
                self.end_session().await?;
                return Ok(SyncOutcome::AuthInvalid);
            }
            Err(TransportError::RateLimited) => {
                self.notifier.set_notice(Some(UserNotice::SyncRateLimited));
                return Ok(SyncOutcome::RateLimited);
            }
            Err(TransportError::Failed(err)) => {
                debug!(error = %err, "Sync cycle failed");
                self.status.on_sync(false);
                return Ok(SyncOutcome::Failed);
            }
        };

        // A successful exchange clears any visible notice
        self.notifier.set_notice(None);

        if !self.handle.is_enabled() {
            debug!("Scheduling disabled during exchange; discarding results");
            return Ok(SyncOutcome::Discarded);
        }

        self.reconcile(&list, remote).await?;
        self.status.on_sync(true);
        Ok(SyncOutcome::Completed)
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Fold the authoritative set into local state
    ///
    /// Partitions the response against the working list:
    /// - **matched** (by `replaces` echo or by id): controller merge
    /// - **only-local**: controller merge against absence
    /// - **only-remote**: fresh records persisted, id added
    ///
    /// then rewrites the working list from the accumulated effects.
    async fn reconcile(&self, list: &WorkingList, remote: Vec<AuthoritativeItem>) -> Result<()> {
        let mut arena = self.controllers.lock().await;
        let mut effects = MergeEffects::default();

        let mut unmatched: Vec<ItemId> = list.iter().cloned().collect();
        let mut fresh: Vec<AuthoritativeItem> = Vec::new();

        for item in remote {
            let match_id = item
                .replaces
                .clone()
                .filter(|replaced| unmatched.contains(replaced))
                .or_else(|| unmatched.contains(&item.id).then(|| item.id.clone()));

            match match_id {
                Some(mid) => {
                    unmatched.retain(|id| id != &mid);
                    let controller = arena.ensure(&mid);
                    controller
                        .merge(Some(&item), &mut effects)
                        .await
                        .with_context(|| format!("merge for {mid}"))?;
                }
                None => fresh.push(item),
            }
        }

        for id in &unmatched {
            let controller = arena.ensure(id);
            controller
                .merge(None, &mut effects)
                .await
                .with_context(|| format!("merge for {id}"))?;
        }

        // Items that originated elsewhere (another session/device): adopt
        // the server state with no local edits pending
        for item in fresh {
            debug!(id = %item.id, version = item.version, "Adopting new remote item");
            self.records
                .put_remote(
                    &item.id,
                    &RemoteRecord {
                        version: item.version,
                        value: item.value.clone(),
                    },
                )
                .await?;
            self.records
                .put_local(&item.id, &LocalRecord::from_remote_version(item.version))
                .await?;
            effects.added(item.id);
        }

        for id in effects.removals() {
            arena.remove(id);
        }
        for id in effects.additions() {
            arena.insert(id.clone());
        }

        let next = list.rebuilt(
            effects.removals().iter(),
            effects.additions().iter().cloned(),
            self.order,
        );
        self.records.save_list(&next).await?;

        info!(
            removed = effects.removals().len(),
            added = effects.additions().len(),
            items = next.len(),
            "Reconciliation applied"
        );
        Ok(())
    }

    // ========================================================================
    // Session end
    // ========================================================================

    /// Tear the session down: stop scheduling, drop the credential, and
    /// collapse every item to a disconnected, purely local state
    ///
    /// Called on logout and when the server rejects the credential
    /// mid-cycle; in the latter case this runs exactly once per cycle
    /// because the cycle makes a single exchange.
    pub async fn end_session(&self) -> Result<()> {
        self.handle.disable();
        self.set_token(None);

        let mut arena = self.controllers.lock().await;
        let list = collapse_to_local(&self.records).await?;
        arena.reset(list.iter());

        info!(items = list.len(), "Session ended; items collapsed to local state");
        Ok(())
    }
}
