//! Owned trigger backup shared by a connector for the duration of a run.

use anyhow::Result;
use tokio::sync::Mutex;

use crate::store::{StoredTriggers, TriggerDefinition, TriggerKey, TriggerSet, TriggerStore};

/// Backed-up trigger definitions plus the store persisting them.
///
/// Every mutation is written through to the store, so a process killed while
/// triggers are dropped leaves a backup that the next run picks up.
///
/// # Example
///
/// ```rust,ignore
/// let backup = TriggerBackup::open(FilesystemStore::in_dir("settings")).await?;
/// backup.record(definitions).await?;
///
/// let pending = backup.for_table("shop", "orders").await;
/// // drop and recreate each trigger, collecting the keys that succeeded
/// backup.mark_restored(&restored).await?;
/// ```
pub struct TriggerBackup {
    store: Box<dyn TriggerStore>,
    triggers: Mutex<TriggerSet>,
}

impl TriggerBackup {
    /// Open the backup, loading any definitions left by a previous run.
    pub async fn open(store: impl TriggerStore + 'static) -> Result<Self> {
        let triggers = store
            .read_triggers()
            .await?
            .map(StoredTriggers::into_set)
            .unwrap_or_default();
        if !triggers.is_empty() {
            tracing::warn!(
                "Found {} trigger(s) left from a previous run, they will be restored after their table is filled",
                triggers.len()
            );
        }
        Ok(Self {
            store: Box::new(store),
            triggers: Mutex::new(triggers),
        })
    }

    /// Add definitions to the backup and persist it.
    ///
    /// A definition already present is kept as is.
    pub async fn record(&self, definitions: Vec<TriggerDefinition>) -> Result<()> {
        let mut triggers = self.triggers.lock().await;
        for definition in definitions {
            triggers.entry(definition.key()).or_insert(definition);
        }
        self.store
            .store_triggers(&StoredTriggers::from_set(&triggers))
            .await
    }

    /// Snapshot of the backed-up triggers firing on a table.
    pub async fn for_table(&self, schema: &str, table: &str) -> Vec<TriggerDefinition> {
        self.triggers
            .lock()
            .await
            .values()
            .filter(|t| t.table_schema == schema && t.table == table)
            .cloned()
            .collect()
    }

    /// Remove restored triggers from the backup and persist it.
    pub async fn mark_restored(&self, keys: &[TriggerKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut triggers = self.triggers.lock().await;
        for key in keys {
            triggers.remove(key);
        }
        self.store
            .store_triggers(&StoredTriggers::from_set(&triggers))
            .await
    }

    /// Flag triggers as dropped from the database and persist the backup.
    pub async fn mark_dropped(&self, keys: &[TriggerKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut triggers = self.triggers.lock().await;
        for key in keys {
            if let Some(trigger) = triggers.get_mut(key) {
                trigger.dropped = true;
            }
        }
        self.store
            .store_triggers(&StoredTriggers::from_set(&triggers))
            .await
    }

    /// Number of backed-up triggers.
    pub async fn len(&self) -> usize {
        self.triggers.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.triggers.lock().await.is_empty()
    }

    /// Triggers dropped and not restored yet.
    pub async fn pending(&self) -> Vec<TriggerDefinition> {
        self.triggers
            .lock()
            .await
            .values()
            .filter(|t| t.dropped)
            .cloned()
            .collect()
    }

    /// Forget triggers that were never dropped and delete the store if
    /// nothing is left to restore.
    ///
    /// Returns false when dropped triggers remain; they stay in the store.
    pub async fn clean(&self) -> Result<bool> {
        let mut triggers = self.triggers.lock().await;
        triggers.retain(|_, t| t.dropped);
        if triggers.is_empty() {
            self.store.clear().await?;
            return Ok(true);
        }
        tracing::warn!(
            "{} trigger(s) could not be restored, keeping the backup for the next run",
            triggers.len()
        );
        self.store
            .store_triggers(&StoredTriggers::from_set(&triggers))
            .await?;
        Ok(false)
    }
}
