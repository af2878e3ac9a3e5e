//! On-disk settings: persisted schema, customization and global scripts.
//!
//! Layout of the settings directory:
//!
//! ```text
//! settings/
//!   <schema>.json            introspected schema, written by --analyse
//!   <schema>_custom.jsonc    user customization, comments allowed
//!   triggers.json            trigger backup, present while triggers are dropped
//!   scripts/*.sql            global scripts run before the fill
//! ```

use anyhow::Context;
use fill_core::{CustomSchema, FillError, Schema};
use json_comments::StripComments;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_SETTINGS_DIR: &str = "settings";
pub const DEFAULT_SCHEMA_NAME: &str = "schema";
pub const SCRIPTS_DIR: &str = "scripts";
const SCRIPT_EXTENSION: &str = "sql";

/// Paths of one schema's settings files.
#[derive(Debug, Clone)]
pub struct Settings {
    dir: PathBuf,
    name: String,
}

impl Settings {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }

    pub fn custom_path(&self) -> PathBuf {
        self.dir.join(format!("{}_custom.jsonc", self.name))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.dir.join(SCRIPTS_DIR)
    }

    /// Create the settings and scripts directories if needed.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        let scripts = self.scripts_dir();
        fs::create_dir_all(&scripts)
            .with_context(|| format!("Failed to create {}", scripts.display()))?;
        Ok(())
    }

    /// Read the persisted schema.
    pub fn load_schema(&self) -> anyhow::Result<Schema> {
        let path = self.schema_path();
        if !path.exists() {
            return Err(FillError::Configuration(format!(
                "Schema file {} not found. Please run with --analyse first.",
                path.display()
            ))
            .into());
        }
        Schema::from_file(&path).with_context(|| {
            format!(
                "Unable to read from {}. Please run with --analyse first.",
                path.display()
            )
        })
    }

    pub fn write_schema(&self, schema: &Schema) -> anyhow::Result<()> {
        let path = self.schema_path();
        schema
            .write_file(&path)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        info!("Schema written to {}", path.display());
        Ok(())
    }

    /// Read the customization file.
    ///
    /// A missing file yields the default customization. A file that exists but
    /// does not parse is an error.
    pub fn load_custom(&self) -> anyhow::Result<CustomSchema> {
        let path = self.custom_path();
        if !path.exists() {
            warn!(
                "Unable to read {}, this will not take any customization into account.",
                path.display()
            );
            return Ok(CustomSchema::default());
        }
        let file = fs::File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        parse_custom(StripComments::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write a default customization file unless one exists.
    ///
    /// Returns true when a file was written.
    pub fn write_default_custom(&self) -> anyhow::Result<bool> {
        let path = self.custom_path();
        if path.exists() {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(&CustomSchema::default())?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Default customization written to {}", path.display());
        Ok(true)
    }

    /// Global `*.sql` scripts, sorted by file name.
    pub fn scripts(&self) -> anyhow::Result<Vec<PathBuf>> {
        let dir = self.scripts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut scripts = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == SCRIPT_EXTENSION) {
                scripts.push(path);
            }
        }
        scripts.sort();
        Ok(scripts)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_DIR, DEFAULT_SCHEMA_NAME)
    }
}

/// Parse a customization document whose comments were already stripped.
pub fn parse_custom(reader: impl std::io::Read) -> anyhow::Result<CustomSchema> {
    Ok(serde_json::from_reader(reader)?)
}
