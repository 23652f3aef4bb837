//! Durable key-value store port (driven/secondary port)
//!
//! A single place mapping a string key to a JSON value, persisted across
//! process restarts. The working list lives under one key and every item
//! owns two further records, with keys derived deterministically from the
//! item id.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, in-memory, ...) and don't need domain-level classification.
//! - [`Records`] wraps a store reference with the typed read/write
//!   helpers the engine and controllers use, so key derivation and serde
//!   live in exactly one place.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::id::{ItemId, LIST_KEY};
use crate::domain::record::{LocalRecord, RemoteRecord};
use crate::domain::WorkingList;

/// Port trait for durable key->JSON persistence
///
/// Implementations must survive process restart and may assume a single
/// writer: the thread driving the scheduler/reconciliation is the only
/// mutator.
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Reads the value stored under `key`, or `None`
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key` (insert or replace)
    async fn put(&self, key: &str, value: &Value) -> Result<()>;

    /// Removes `key`; removing an absent key is a no-op
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Typed record access over an [`ItemStore`]
///
/// Cheap to construct; borrows the store for the duration of a call
/// sequence.
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn ItemStore>,
}

impl Records {
    /// Wrap a store handle
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// The item's remote snapshot, if one was ever persisted
    pub async fn remote(&self, id: &ItemId) -> Result<Option<RemoteRecord>> {
        match self.store.get(&id.remote_record_key()).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .with_context(|| format!("corrupt remote record for {id}")),
            None => Ok(None),
        }
    }

    /// The item's local record, if one exists
    pub async fn local(&self, id: &ItemId) -> Result<Option<LocalRecord>> {
        match self.store.get(&id.local_record_key()).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .with_context(|| format!("corrupt local record for {id}")),
            None => Ok(None),
        }
    }

    /// Persist the item's remote snapshot
    pub async fn put_remote(&self, id: &ItemId, record: &RemoteRecord) -> Result<()> {
        let value = serde_json::to_value(record).context("serialize remote record")?;
        self.store.put(&id.remote_record_key(), &value).await
    }

    /// Persist the item's local record
    pub async fn put_local(&self, id: &ItemId, record: &LocalRecord) -> Result<()> {
        let value = serde_json::to_value(record).context("serialize local record")?;
        self.store.put(&id.local_record_key(), &value).await
    }

    /// Delete both of the item's records
    pub async fn delete_item(&self, id: &ItemId) -> Result<()> {
        self.store.delete(&id.remote_record_key()).await?;
        self.store.delete(&id.local_record_key()).await
    }

    /// Load the working list; an absent record is an empty list
    pub async fn load_list(&self) -> Result<WorkingList> {
        match self.store.get(LIST_KEY).await? {
            Some(value) => {
                serde_json::from_value(value).context("corrupt working list record")
            }
            None => Ok(WorkingList::new()),
        }
    }

    /// Persist the working list
    pub async fn save_list(&self, list: &WorkingList) -> Result<()> {
        let value = serde_json::to_value(list).context("serialize working list")?;
        self.store.put(LIST_KEY, &value).await
    }

    /// The underlying store handle
    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }
}
