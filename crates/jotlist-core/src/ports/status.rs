//! Status and user-notice collaborator ports
//!
//! The status collaborator tracks the last successful sync and the
//! in-flight flag; the rate guard consults it before every attempt. The
//! notifier surfaces transient, user-visible notices (rate-limit and
//! overlength warnings); notices expire after a fixed display duration.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Transient user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserNotice {
    /// A sync attempt was refused for rate reasons (client guard or
    /// server 429)
    SyncRateLimited,
    /// The working list exceeds the configured soft cap
    ListOverlength,
}

/// Port trait for the sync-status collaborator
pub trait StatusSink: Send + Sync {
    /// Monotonic instant of the last successful sync, for the rate guard
    fn last_sync_instant(&self) -> Option<Instant>;

    /// Wall-clock time of the last successful sync, for display
    fn last_sync_at(&self) -> Option<DateTime<Utc>>;

    /// Whether a sync attempt is currently in flight
    fn is_syncing(&self) -> bool;

    /// Set the in-flight flag
    fn set_syncing(&self, syncing: bool);

    /// Report the outcome of a completed sync cycle
    ///
    /// A `true` outcome updates the last-sync timestamps the rate guard
    /// and display read.
    fn on_sync(&self, success: bool);
}

/// Port trait for the error/notice display collaborator
pub trait Notifier: Send + Sync {
    /// Set the current notice; `None` clears it
    fn set_notice(&self, notice: Option<UserNotice>);

    /// The currently visible notice, if any (expired notices read as
    /// `None`)
    fn current(&self) -> Option<UserNotice>;
}
