//! SQLite implementation of the ItemStore port
//!
//! Values are stored as their JSON text in a single `kv` table. The store
//! is oblivious to what it holds - working list, remote snapshots, and
//! local records all pass through the same three operations.

use anyhow::Result;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use jotlist_core::ports::ItemStore;

use crate::StoreError;

/// SQLite-backed implementation of the `ItemStore` port
///
/// All operations go through a connection pool; writes are atomic per
/// statement, which is all the single-writer model requires.
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ItemStore for SqliteItemStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        match row {
            Some(row) => {
                let text: String = row.get("value");
                let value =
                    serde_json::from_str(&text).map_err(|e| StoreError::CorruptValue {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &Value) -> Result<()> {
        let text = value.to_string();
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(text)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}
