//! Integration tests for the SQLite store
//!
//! Exercises the durable path: values written through one pool must be
//! readable through a fresh pool opened on the same file, which is what
//! "survives process restart" means for the sync model.

use serde_json::json;

use jotlist_core::domain::{ItemId, LocalRecord, RemoteRecord, WorkingList};
use jotlist_core::ports::{ItemStore, Records};
use jotlist_store::{DatabasePool, SqliteItemStore};
use std::sync::Arc;

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jotlist.db");

    {
        let pool = DatabasePool::new(&db_path).await.unwrap();
        let store = SqliteItemStore::new(pool.pool().clone());
        store.put("list", &json!(["r1", "r2"])).await.unwrap();
        store
            .put("item.local.r1", &json!({"base_version": 0, "version": 2, "value": "x"}))
            .await
            .unwrap();
    }

    // Reopen: a brand-new pool over the same file sees the same data
    let pool = DatabasePool::new(&db_path).await.unwrap();
    let store = SqliteItemStore::new(pool.pool().clone());

    assert_eq!(store.get("list").await.unwrap(), Some(json!(["r1", "r2"])));
    assert_eq!(
        store.get("item.local.r1").await.unwrap(),
        Some(json!({"base_version": 0, "version": 2, "value": "x"}))
    );
}

#[tokio::test]
async fn test_typed_records_over_sqlite() {
    let pool = DatabasePool::in_memory().await.unwrap();
    let store: Arc<dyn ItemStore> = Arc::new(SqliteItemStore::new(pool.pool().clone()));
    let records = Records::new(store);

    let id = ItemId::new("r7".to_string()).unwrap();
    records
        .put_remote(&id, &RemoteRecord { version: 3, value: Some(json!("y")) })
        .await
        .unwrap();
    records
        .put_local(&id, &LocalRecord::new(3, 5, Some(json!("y'"))).unwrap())
        .await
        .unwrap();

    let remote = records.remote(&id).await.unwrap().unwrap();
    assert_eq!(remote.version, 3);

    let local = records.local(&id).await.unwrap().unwrap();
    assert!(local.is_pending());

    records.delete_item(&id).await.unwrap();
    assert!(records.remote(&id).await.unwrap().is_none());
    assert!(records.local(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_working_list_roundtrip() {
    let pool = DatabasePool::in_memory().await.unwrap();
    let store: Arc<dyn ItemStore> = Arc::new(SqliteItemStore::new(pool.pool().clone()));
    let records = Records::new(store);

    // Absent record reads as empty list
    assert!(records.load_list().await.unwrap().is_empty());

    let list = WorkingList::from_ids(vec![
        ItemId::new("a".to_string()).unwrap(),
        ItemId::new("b".to_string()).unwrap(),
    ])
    .unwrap();
    records.save_list(&list).await.unwrap();
    assert_eq!(records.load_list().await.unwrap(), list);
}
