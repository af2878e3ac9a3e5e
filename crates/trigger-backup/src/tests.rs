//! Unit tests for the trigger-backup crate.

use tempfile::TempDir;

use crate::{FilesystemStore, MemoryStore, TriggerBackup, TriggerDefinition, TriggerStore};

fn trigger(table: &str, name: &str) -> TriggerDefinition {
    TriggerDefinition {
        name: name.to_string(),
        schema: "shop".to_string(),
        table_schema: "shop".to_string(),
        table: table.to_string(),
        timing: "AFTER".to_string(),
        event: "INSERT".to_string(),
        statement: "SET @count = @count + 1".to_string(),
        definer: Some("`root`@`%`".to_string()),
        dropped: false,
    }
}

// ============================================================================
// Store Tests
// ============================================================================

#[tokio::test]
async fn test_filesystem_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::in_dir(dir.path());
    assert!(store.read_triggers().await.unwrap().is_none());

    let backup = TriggerBackup::open(FilesystemStore::in_dir(dir.path()))
        .await
        .unwrap();
    backup
        .record(vec![trigger("orders", "t1"), trigger("orders", "t2")])
        .await
        .unwrap();

    let stored = store.read_triggers().await.unwrap().unwrap();
    assert_eq!(stored.triggers.len(), 2);
    assert!(dir.path().join("triggers.json").exists());
}

#[tokio::test]
async fn test_backup_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let backup = TriggerBackup::open(FilesystemStore::in_dir(dir.path()))
            .await
            .unwrap();
        let definition = trigger("orders", "t1");
        let key = definition.key();
        backup.record(vec![definition]).await.unwrap();
        backup.mark_dropped(&[key]).await.unwrap();
    }

    let reopened = TriggerBackup::open(FilesystemStore::in_dir(dir.path()))
        .await
        .unwrap();
    let pending = reopened.pending().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].name, "t1");
}

// ============================================================================
// TriggerBackup Tests
// ============================================================================

#[tokio::test]
async fn test_for_table_filters_by_table() {
    let backup = TriggerBackup::open(MemoryStore::new()).await.unwrap();
    backup
        .record(vec![trigger("orders", "t1"), trigger("customers", "t2")])
        .await
        .unwrap();

    let orders = backup.for_table("shop", "orders").await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].name, "t1");
    assert!(backup.for_table("other", "orders").await.is_empty());
}

#[tokio::test]
async fn test_record_keeps_existing_definition() {
    let backup = TriggerBackup::open(MemoryStore::new()).await.unwrap();
    let original = trigger("orders", "t1");
    backup.record(vec![original.clone()]).await.unwrap();

    let mut changed = original.clone();
    changed.statement = "SET @x = 1".to_string();
    backup.record(vec![changed]).await.unwrap();

    assert_eq!(backup.for_table("shop", "orders").await, vec![original]);
}

#[tokio::test]
async fn test_mark_restored_removes_only_given_keys() {
    let backup = TriggerBackup::open(MemoryStore::new()).await.unwrap();
    let t1 = trigger("orders", "t1");
    let t2 = trigger("orders", "t2");
    backup.record(vec![t1.clone(), t2.clone()]).await.unwrap();

    backup.mark_restored(&[t1.key()]).await.unwrap();
    assert_eq!(backup.for_table("shop", "orders").await, vec![t2]);
}

#[tokio::test]
async fn test_clean_keeps_unrestored_triggers() {
    let dir = TempDir::new().unwrap();
    let backup = TriggerBackup::open(FilesystemStore::in_dir(dir.path()))
        .await
        .unwrap();
    let t1 = trigger("orders", "t1");
    let t2 = trigger("customers", "t2");
    backup.record(vec![t1.clone(), t2]).await.unwrap();
    backup.mark_dropped(&[t1.key()]).await.unwrap();

    assert!(!backup.clean().await.unwrap());
    assert_eq!(backup.len().await, 1);
    assert!(dir.path().join("triggers.json").exists());

    backup.mark_restored(&[t1.key()]).await.unwrap();
    assert!(backup.clean().await.unwrap());
    assert!(!dir.path().join("triggers.json").exists());
}
