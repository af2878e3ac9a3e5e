//! Trigger backup for datafill
//!
//! Bulk inserts run with a table's triggers dropped. Before dropping them, the
//! connector persists each trigger's full definition so that it can be
//! recreated afterwards, even by a later process if this one dies mid-fill.
//!
//! # Architecture
//!
//! - [`TriggerDefinition`] - Everything needed to recreate one trigger
//! - [`TriggerStore`] - Storage backend for the backup
//! - [`TriggerBackup`] - Owned mapping keyed by `(schema, table, name)`,
//!   written through to a store on every change
//!
//! ## Storage Backends
//!
//! - `FilesystemStore` - Stores the backup as `settings/triggers.json`
//! - `MemoryStore` - Keeps the backup in memory, for tests

mod filesystem;
mod manager;
mod memory;
pub mod store;

#[cfg(test)]
mod tests;

pub use filesystem::{FilesystemStore, DEFAULT_BACKUP_FILE};
pub use manager::TriggerBackup;
pub use memory::MemoryStore;
pub use store::{StoredTriggers, TriggerDefinition, TriggerKey, TriggerSet, TriggerStore};
