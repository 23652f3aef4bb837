//! Jotlist Store - Durable key->JSON persistence
//!
//! Adapters implementing the `ItemStore` port from `jotlist-core`:
//!
//! - [`SqliteItemStore`] - the production store, a single `kv` table in
//!   SQLite (survives process restart, single-writer)
//! - [`MemoryItemStore`] - in-process store for tests and ephemeral runs
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use jotlist_store::{DatabasePool, SqliteItemStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/jotlist/jotlist.db")).await?;
//! let store = SqliteItemStore::new(pool.pool().clone());
//! // Use store as Arc<dyn ItemStore>...
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod pool;
pub mod sqlite;

pub use memory::MemoryItemStore;
pub use pool::DatabasePool;
pub use sqlite::SqliteItemStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value is not valid JSON
    #[error("Corrupt stored value under key {key}: {reason}")]
    CorruptValue {
        /// The key whose value failed to parse
        key: String,
        /// Parser error detail
        reason: String,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
