//! CLI command implementations and shared wiring
//!
//! [`AppContext`] assembles the full stack once per invocation: config,
//! SQLite store, HTTP transport, status/notice collaborators, and the
//! scheduler/engine pair behind a `SessionManager`.

pub mod auth;
pub mod items;
pub mod sync;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use jotlist_api::{HttpSyncTransport, KeyringTokenStorage, TokenStorage};
use jotlist_core::config::Config;
use jotlist_core::ports::{ItemStore, Notifier, StatusSink, SyncTransport};
use jotlist_store::{DatabasePool, SqliteItemStore};
use jotlist_sync::{
    NoticeBoard, SchedulerHandle, SessionManager, SyncEngine, SyncScheduler, SyncStatus,
};

/// Everything a command needs, wired once per CLI invocation
pub struct AppContext {
    pub config: Config,
    pub session: SessionManager,
    pub notices: Arc<NoticeBoard>,
    pub tokens: KeyringTokenStorage,
}

impl AppContext {
    /// Load configuration and assemble the engine stack
    pub async fn init(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(Path::new(path))
                .with_context(|| format!("Failed to load config from {path}"))?,
            None => Config::load_or_default(&Config::default_path()),
        };

        let pool = DatabasePool::new(&config.storage.db_path)
            .await
            .context("Failed to open database")?;
        let store: Arc<dyn ItemStore> = Arc::new(SqliteItemStore::new(pool.pool().clone()));

        let transport: Arc<dyn SyncTransport> = Arc::new(HttpSyncTransport::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )?);

        let status = Arc::new(SyncStatus::new());
        let notices = Arc::new(NoticeBoard::new(Duration::from_secs(
            config.list.notice_display_secs,
        )));

        let handle = SchedulerHandle::new(&config.sync);
        let engine = Arc::new(SyncEngine::new(
            store,
            transport,
            status.clone() as Arc<dyn StatusSink>,
            notices.clone() as Arc<dyn Notifier>,
            handle.clone(),
            &config,
        ));
        let scheduler = SyncScheduler::new(handle, engine);

        Ok(Self {
            config,
            session: SessionManager::new(scheduler),
            notices,
            tokens: KeyringTokenStorage,
        })
    }

    /// The stored credential, if any
    pub fn stored_token(&self) -> Result<Option<String>> {
        self.tokens.load()
    }
}
