//! Configuration module for jotlist.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults. The timing defaults are
//! the protocol's canonical values: 60s edit debounce, 600s idle ceiling,
//! 60s poll granularity, 15s minimum interval between attempts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::ListOrder;

/// Top-level configuration for jotlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub list: ListConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Sync endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the sync service.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Sync scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds of quiet after the last edit before a sync is attempted.
    pub debounce_secs: u64,
    /// Maximum seconds between syncs when no edits occur.
    pub idle_ceiling_secs: u64,
    /// How often the scheduling loop re-evaluates its deadline, in seconds.
    pub poll_granularity_secs: u64,
    /// Minimum seconds between two sync attempts (hard rate guard).
    pub min_sync_interval_secs: u64,
}

/// Working-list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Soft cap on the number of items; exceeding it warns and bounds the
    /// sync batch, it never truncates the list.
    pub max_len: usize,
    /// Ordering imposed on the list after reconciliation.
    pub order: ListOrder,
    /// Seconds a transient notice stays visible.
    pub notice_display_secs: u64,
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/jotlist/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("jotlist")
            .join("config.yaml")
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if self.sync.poll_granularity_secs == 0 {
            anyhow::bail!("sync.poll_granularity_secs must be at least 1");
        }
        if self.sync.idle_ceiling_secs < self.sync.debounce_secs {
            anyhow::bail!(
                "sync.idle_ceiling_secs ({}) must not be below sync.debounce_secs ({})",
                self.sync.idle_ceiling_secs,
                self.sync.debounce_secs
            );
        }
        if self.list.max_len == 0 {
            anyhow::bail!("list.max_len must be at least 1");
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }

    /// Idle ceiling as a [`Duration`].
    pub fn idle_ceiling(&self) -> Duration {
        Duration::from_secs(self.idle_ceiling_secs)
    }

    /// Poll granularity as a [`Duration`].
    pub fn poll_granularity(&self) -> Duration {
        Duration::from_secs(self.poll_granularity_secs)
    }

    /// Minimum attempt interval as a [`Duration`].
    pub fn min_sync_interval(&self) -> Duration {
        Duration::from_secs(self.min_sync_interval_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jotlist.io".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_secs: 60,
            idle_ceiling_secs: 600,
            poll_granularity_secs: 60,
            min_sync_interval_secs: 15,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            max_len: 10,
            order: ListOrder::default(),
            notice_display_secs: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jotlist")
                .join("jotlist.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
