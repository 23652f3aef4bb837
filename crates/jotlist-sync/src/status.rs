//! In-process status and notice collaborators
//!
//! [`SyncStatus`] implements the `StatusSink` port: it tracks the last
//! successful sync (monotonic instant for the rate guard, wall-clock for
//! display) and the single in-flight flag. [`NoticeBoard`] implements
//! `Notifier`: it holds at most one transient notice, which expires after
//! the configured display duration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use jotlist_core::ports::{Notifier, StatusSink, UserNotice};

#[derive(Debug, Default)]
struct StatusInner {
    last_instant: Option<Instant>,
    last_at: Option<DateTime<Utc>>,
    last_result: Option<bool>,
}

/// Default `StatusSink` implementation
#[derive(Debug, Default)]
pub struct SyncStatus {
    inner: Mutex<StatusInner>,
    syncing: AtomicBool,
}

impl SyncStatus {
    /// Creates a status sink with no sync history
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome of the most recently completed cycle, if any
    pub fn last_result(&self) -> Option<bool> {
        self.inner.lock().unwrap().last_result
    }
}

impl StatusSink for SyncStatus {
    fn last_sync_instant(&self) -> Option<Instant> {
        self.inner.lock().unwrap().last_instant
    }

    fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().last_at
    }

    fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    fn set_syncing(&self, syncing: bool) {
        self.syncing.store(syncing, Ordering::Release);
    }

    fn on_sync(&self, success: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_result = Some(success);
        if success {
            inner.last_instant = Some(Instant::now());
            inner.last_at = Some(Utc::now());
        }
    }
}

/// Default `Notifier` implementation
///
/// Holds the latest notice with the instant it was set; reads past the
/// display duration return `None`, matching a UI banner that clears
/// itself.
#[derive(Debug)]
pub struct NoticeBoard {
    display_for: Duration,
    current: Mutex<Option<(UserNotice, Instant)>>,
}

impl NoticeBoard {
    /// Creates a board whose notices stay visible for `display_for`
    pub fn new(display_for: Duration) -> Self {
        Self {
            display_for,
            current: Mutex::new(None),
        }
    }
}

impl Notifier for NoticeBoard {
    fn set_notice(&self, notice: Option<UserNotice>) {
        *self.current.lock().unwrap() = notice.map(|n| (n, Instant::now()));
    }

    fn current(&self) -> Option<UserNotice> {
        let current = self.current.lock().unwrap();
        match *current {
            Some((notice, since)) if since.elapsed() < self.display_for => Some(notice),
            _ => None,
        }
    }
}
