//! In-memory implementation of the ItemStore port
//!
//! Used by tests and ephemeral runs. Does not survive restart; everything
//! else behaves like the SQLite store.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use serde_json::Value;

use jotlist_core::ports::ItemStore;

/// HashMap-backed `ItemStore`
#[derive(Default)]
pub struct MemoryItemStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryItemStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored (test helper)
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all stored keys, sorted (test helper)
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .expect("store lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl ItemStore for MemoryItemStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self
            .entries
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned())
    }

    async fn put(&self, key: &str, value: &Value) -> Result<()> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = MemoryItemStore::new();
        store.put("list", &json!(["a", "b"])).await.unwrap();
        assert_eq!(store.get("list").await.unwrap(), Some(json!(["a", "b"])));
        store.delete("list").await.unwrap();
        assert!(store.get("list").await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
