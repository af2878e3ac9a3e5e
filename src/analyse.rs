//! `--analyse` mode: introspect the database and persist its schema.

use crate::settings::Settings;
use anyhow::Context;
use fill_core::{DatabaseConnector, Schema};
use tracing::info;

/// Introspect the schema behind `connector` and write it to the settings
/// directory, together with a default customization file if none exists.
pub async fn analyse(connector: &dyn DatabaseConnector, settings: &Settings) -> anyhow::Result<Schema> {
    info!("Analysing {} schema", connector.engine());
    let schema = connector
        .get_schema()
        .await
        .context("Failed to introspect the database schema")?;
    info!("Found {} table(s)", schema.tables.len());

    settings.ensure_dirs()?;
    settings.write_schema(&schema)?;
    settings.write_default_custom()?;
    Ok(schema)
}
