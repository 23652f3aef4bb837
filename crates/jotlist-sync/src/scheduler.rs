//! Sync scheduler - decides *when* a sync attempt runs
//!
//! The scheduler keeps two pieces of state: an `enabled` flag and a
//! `next` deadline. Local mutations push the deadline out by the debounce
//! window; every attempt arms the idle ceiling *before* it resolves, so a
//! sync happens periodically even with no edits pending. A cooperative
//! loop re-evaluates the deadline at least once per poll-granularity
//! window, which bounds how long `enable()`/`op()` changes take to be
//! noticed.
//!
//! ## Flow
//!
//! ```text
//! edits ──→ op() ──→ next = now + debounce ─┐
//!                                           ├──→ loop: now >= next ?
//! enable() ─→ next = now (immediate) ───────┘        │ yes
//!                                                    ▼
//!                                      next = now + idle_ceiling
//!                                      SyncEngine::attempt()
//! ```
//!
//! The hard rate guard lives in the engine, not here: it protects the
//! server from abusive attempt rates independent of scheduling bugs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use jotlist_core::config::SyncConfig;

use crate::engine::SyncEngine;

struct HandleInner {
    /// Whether scheduling is active
    enabled: AtomicBool,
    /// Deadline of the next attempt
    next: Mutex<Instant>,
    debounce: Duration,
    idle_ceiling: Duration,
    poll_granularity: Duration,
}

/// Cheap, cloneable view of the scheduler state
///
/// Shared between the scheduling loop and the engine: the engine checks
/// `is_enabled()` at apply-time to discard results that raced a disable,
/// and flips the flag itself when the session ends mid-cycle.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<HandleInner>,
}

impl SchedulerHandle {
    /// Creates a handle with the given timing configuration, disabled
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                enabled: AtomicBool::new(false),
                next: Mutex::new(Instant::now()),
                debounce: config.debounce(),
                idle_ceiling: config.idle_ceiling(),
                poll_granularity: config.poll_granularity(),
            }),
        }
    }

    /// Whether scheduling is currently active
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Mark scheduling active and force an immediate deadline
    ///
    /// Returns `false` (and changes nothing) if already enabled. The
    /// scheduling loop itself is owned by [`SyncScheduler::enable`];
    /// one-shot callers enable the handle and drive a single attempt
    /// directly.
    pub fn enable(&self) -> bool {
        if self.inner.enabled.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.arm_immediate();
        true
    }

    /// Stop scheduling further attempts
    ///
    /// An in-flight attempt still completes, but the engine discards its
    /// reconciliation results when it observes the flag at apply-time.
    pub fn disable(&self) {
        if self.inner.enabled.swap(false, Ordering::AcqRel) {
            info!("Sync scheduling disabled");
        }
    }

    /// Signal a local mutation (create or update)
    ///
    /// Pushes the deadline to `now + debounce`, batching rapid edits into
    /// one round-trip. Deliberately unbounded under a continuous edit
    /// burst: the only ceiling is the idle fallback armed when the
    /// previous attempt started.
    pub fn op(&self) {
        if !self.is_enabled() {
            return;
        }
        let deadline = Instant::now() + self.inner.debounce;
        *self.inner.next.lock().unwrap() = deadline;
        debug!(debounce_secs = self.inner.debounce.as_secs(), "Edit debounce armed");
    }

    /// Whether the deadline has passed
    fn is_due(&self) -> bool {
        Instant::now() >= *self.inner.next.lock().unwrap()
    }

    /// Force the next loop pass to attempt immediately
    fn arm_immediate(&self) {
        *self.inner.next.lock().unwrap() = Instant::now();
    }

    /// Arm the idle fallback; called before an attempt resolves so the
    /// ceiling is measured from attempt start
    fn arm_idle_ceiling(&self) {
        *self.inner.next.lock().unwrap() = Instant::now() + self.inner.idle_ceiling;
    }

    /// How long the loop should wait before re-evaluating
    fn wait_duration(&self) -> Duration {
        let next = *self.inner.next.lock().unwrap();
        next.saturating_duration_since(Instant::now())
            .min(self.inner.poll_granularity)
    }
}

/// Timer-driven sync scheduler
///
/// Owns the scheduling loop task. `enable()` is idempotent and triggers
/// an immediate attempt; `disable()` stops the loop. There are no
/// process-wide singletons: every dependency is injected through the
/// engine.
pub struct SyncScheduler {
    handle: SchedulerHandle,
    engine: Arc<SyncEngine>,
    loop_cancel: Mutex<Option<CancellationToken>>,
}

impl SyncScheduler {
    /// Creates a scheduler driving `engine` with the timing in `handle`
    ///
    /// The handle must be the same one the engine was built with, so that
    /// both sides observe one `enabled` flag.
    pub fn new(handle: SchedulerHandle, engine: Arc<SyncEngine>) -> Self {
        Self {
            handle,
            engine,
            loop_cancel: Mutex::new(None),
        }
    }

    /// The shared scheduler state
    pub fn handle(&self) -> &SchedulerHandle {
        &self.handle
    }

    /// The engine this scheduler drives
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Start scheduling; idempotent
    ///
    /// Arms an immediate attempt and spawns the scheduling loop.
    pub fn enable(&self) {
        if !self.handle.enable() {
            return;
        }

        let cancel = CancellationToken::new();
        if let Some(old) = self
            .loop_cancel
            .lock()
            .unwrap()
            .replace(cancel.clone())
        {
            // A previous loop may still be draining after an engine-side
            // disable; make sure it exits before the new one takes over
            old.cancel();
        }

        info!("Sync scheduling enabled");
        tokio::spawn(run_loop(self.handle.clone(), self.engine.clone(), cancel));
    }

    /// Stop scheduling and wind the loop down
    pub fn disable(&self) {
        self.handle.disable();
        if let Some(cancel) = self.loop_cancel.lock().unwrap().take() {
            cancel.cancel();
        }
    }

    /// Signal a local mutation; see [`SchedulerHandle::op`]
    pub fn op(&self) {
        self.handle.op();
    }

    /// Run one attempt right now, bypassing the debounce deadline
    ///
    /// Still subject to the engine's rate guard and single-in-flight
    /// rule.
    pub async fn sync_now(&self) -> anyhow::Result<crate::engine::SyncOutcome> {
        self.engine.attempt().await
    }
}

/// The cooperative scheduling loop
///
/// Exits when the handle is disabled or the token is cancelled. Each pass
/// either performs one attempt (deadline reached) or sleeps until the
/// deadline, capped at the poll granularity.
async fn run_loop(handle: SchedulerHandle, engine: Arc<SyncEngine>, cancel: CancellationToken) {
    debug!("Scheduler loop started");

    loop {
        if cancel.is_cancelled() || !handle.is_enabled() {
            break;
        }

        if handle.is_due() {
            handle.arm_idle_ceiling();
            if let Err(err) = engine.attempt().await {
                warn!(error = %err, "Sync attempt errored");
            }
        }

        let wait = handle.wait_duration();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = cancel.cancelled() => break,
        }
    }

    debug!("Scheduler loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> SchedulerHandle {
        SchedulerHandle::new(&SyncConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_op_ignored_while_disabled() {
        let handle = handle();
        let before = *handle.inner.next.lock().unwrap();
        handle.op();
        assert_eq!(*handle.inner.next.lock().unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_op_pushes_deadline_by_debounce() {
        let handle = handle();
        handle.enable();
        handle.op();
        assert!(!handle.is_due());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!handle.is_due());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(handle.is_due());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_ops_keep_postponing() {
        let handle = handle();
        handle.enable();

        handle.op();
        tokio::time::advance(Duration::from_secs(50)).await;
        handle.op();
        tokio::time::advance(Duration::from_secs(50)).await;
        // 100s after the first op, but only 50s after the second
        assert!(!handle.is_due());
        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(handle.is_due());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_duration_capped_at_poll_granularity() {
        let handle = handle();
        handle.enable();
        handle.arm_idle_ceiling();
        // deadline is 600s away, but the loop must wake within 60s
        assert_eq!(handle.wait_duration(), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(580)).await;
        assert_eq!(handle.wait_duration(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_is_observable() {
        let handle = handle();
        handle.enable();
        assert!(handle.is_enabled());
        handle.disable();
        assert!(!handle.is_enabled());
        // disabling twice is a no-op
        handle.disable();
        assert!(!handle.is_enabled());
    }
}
