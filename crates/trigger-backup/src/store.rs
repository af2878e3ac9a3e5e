//! Trigger backup storage trait and types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies a trigger: `(schema, table, trigger name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerKey {
    pub schema: String,
    pub table: String,
    pub name: String,
}

impl TriggerKey {
    pub fn new(schema: impl Into<String>, table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            name: name.into(),
        }
    }
}

/// Everything needed to recreate a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDefinition {
    pub name: String,
    /// Schema the trigger lives in
    pub schema: String,
    /// Schema of the table the trigger fires on
    pub table_schema: String,
    pub table: String,
    /// `BEFORE` / `AFTER` / `INSTEAD OF`
    pub timing: String,
    /// `INSERT` / `UPDATE` / `DELETE`
    pub event: String,
    /// Trigger body, or the full DDL for engines that expose it
    pub statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definer: Option<String>,
    /// Set once the trigger has been dropped from the database
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dropped: bool,
}

impl TriggerDefinition {
    pub fn key(&self) -> TriggerKey {
        TriggerKey::new(&self.table_schema, &self.table, &self.name)
    }
}

/// Backed-up triggers, keyed by [`TriggerKey`].
pub type TriggerSet = BTreeMap<TriggerKey, TriggerDefinition>;

/// Trigger backup as persisted by a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredTriggers {
    pub triggers: Vec<TriggerDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredTriggers {
    pub fn into_set(self) -> TriggerSet {
        self.triggers.into_iter().map(|t| (t.key(), t)).collect()
    }

    pub fn from_set(set: &TriggerSet) -> Self {
        Self {
            triggers: set.values().cloned().collect(),
            updated_at: Some(Utc::now()),
        }
    }
}

/// Trait for trigger backup storage operations.
///
/// The store is the source of truth for triggers that still need restoring,
/// including those left behind by an aborted run.
#[async_trait]
pub trait TriggerStore: Send + Sync {
    /// Replace the stored backup.
    async fn store_triggers(&self, triggers: &StoredTriggers) -> Result<()>;

    /// Read the stored backup.
    ///
    /// Returns None if nothing has been stored.
    async fn read_triggers(&self) -> Result<Option<StoredTriggers>>;

    /// Delete the stored backup.
    async fn clear(&self) -> Result<()>;
}
