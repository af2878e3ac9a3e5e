//! Filesystem-based trigger backup storage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::store::{StoredTriggers, TriggerStore};

/// Default backup file name inside the settings directory.
pub const DEFAULT_BACKUP_FILE: &str = "triggers.json";

/// Filesystem implementation of TriggerStore trait.
///
/// Stores the backup as one JSON file.
pub struct FilesystemStore {
    path: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore writing to the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store writing `triggers.json` inside the given directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_BACKUP_FILE))
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TriggerStore for FilesystemStore {
    async fn store_triggers(&self, triggers: &StoredTriggers) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(triggers)?)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::debug!(
            "Stored {} trigger(s) to {}",
            triggers.triggers.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn read_triggers(&self) -> Result<Option<StoredTriggers>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::info!("Removed trigger backup {}", self.path.display());
        }
        Ok(())
    }
}
