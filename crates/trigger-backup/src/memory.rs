//! In-memory trigger backup storage.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use crate::store::{StoredTriggers, TriggerStore};

/// TriggerStore keeping the backup in memory. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    stored: Mutex<Option<StoredTriggers>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TriggerStore for MemoryStore {
    async fn store_triggers(&self, triggers: &StoredTriggers) -> Result<()> {
        *self
            .stored
            .lock()
            .map_err(|_| anyhow::anyhow!("trigger store lock poisoned"))? = Some(triggers.clone());
        Ok(())
    }

    async fn read_triggers(&self) -> Result<Option<StoredTriggers>> {
        Ok(self
            .stored
            .lock()
            .map_err(|_| anyhow::anyhow!("trigger store lock poisoned"))?
            .clone())
    }

    async fn clear(&self) -> Result<()> {
        *self
            .stored
            .lock()
            .map_err(|_| anyhow::anyhow!("trigger store lock poisoned"))? = None;
        Ok(())
    }
}
