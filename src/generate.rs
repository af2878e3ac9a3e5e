//! Generate mode: plan the fill and run it.

use crate::filler::{FillStats, Filler, SkipHandle};
use crate::progress::{LogProgress, ProgressListener};
use crate::settings::Settings;
use anyhow::Context;
use fill_core::{CustomizedSchema, DatabaseConnector, FillError};
use fill_generator::GeneratorRegistry;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

/// Loads the settings, validates the plan, then fills the database.
pub struct DataGenerator {
    settings: Settings,
    reset: bool,
    registry: GeneratorRegistry,
    progress: Arc<dyn ProgressListener>,
}

impl DataGenerator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            reset: false,
            registry: GeneratorRegistry::with_defaults(),
            progress: Arc::new(LogProgress::new()),
        }
    }

    /// Empty every table before filling it.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Use a registry with extra kinds or custom functions.
    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressListener>) -> Self {
        self.progress = progress;
        self
    }

    /// Build the generation plan from the persisted schema and customization.
    ///
    /// Current row counts are only read when not resetting, since a reset
    /// empties every table first.
    pub async fn plan(&self, connector: &dyn DatabaseConnector) -> anyhow::Result<CustomizedSchema> {
        let schema = self.settings.load_schema()?;
        let custom = self.settings.load_custom()?;

        let mut current_rows = HashMap::new();
        if !self.reset {
            for table in custom.tables_with_row_target() {
                if schema.get_table(&table).is_none() {
                    continue;
                }
                let count = connector.count_lines(&table).await?;
                current_rows.insert(table, count);
            }
        }

        let plan = CustomizedSchema::merge(&schema, &custom, &current_rows);
        let violations = plan.structural_violations(&schema);
        if !violations.is_empty() {
            return Err(FillError::Validation(violations).into());
        }
        self.registry.validate(&plan, connector.engine())?;
        Ok(plan)
    }

    /// Run the whole generation against `connector`.
    ///
    /// The trigger backup is cleaned even when the fill fails, so that
    /// triggers that were never dropped do not linger in it.
    pub async fn run(
        &self,
        connector: &dyn DatabaseConnector,
        skip: SkipHandle,
    ) -> anyhow::Result<FillStats> {
        let plan = self.plan(connector).await?;
        let tables: Vec<String> = plan
            .tables
            .iter()
            .filter(|t| self.reset || t.delta_rows > 0)
            .map(|t| t.name.clone())
            .collect();
        if tables.is_empty() {
            warn!("Nothing to generate, set maxLines, addLines or tablesToFill in the customization file");
        }

        self.run_global_scripts(connector, &plan).await?;

        connector.backup_triggers(&tables).await?;
        let after_all = plan.settings.after_all.clone();
        let mut filler = Filler::new(connector, plan, &self.registry, self.progress.clone())
            .with_skip_handle(skip);
        let filled = filler.fill_tables(self.reset).await;

        let result = match filled {
            Ok(stats) => run_scripts(connector, &after_all).await.map(|()| stats),
            Err(e) => Err(e),
        };
        if let Err(e) = connector.clean_backup_triggers().await {
            warn!("Failed to clean the trigger backup: {e}");
        }
        let stats = result?;
        info!("Generation finished, {} row(s) inserted", stats.inserted());
        Ok(stats)
    }

    /// Scripts from the scripts directory, then `beforeAll`.
    async fn run_global_scripts(
        &self,
        connector: &dyn DatabaseConnector,
        plan: &CustomizedSchema,
    ) -> anyhow::Result<()> {
        for path in self.settings.scripts()? {
            info!("Running script {}", path.display());
            let script = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            connector
                .execute_raw_query(&script)
                .await
                .map_err(|source| FillError::ScriptExecution {
                    script: path.display().to_string(),
                    source,
                })?;
        }
        run_scripts(connector, &plan.settings.before_all).await?;
        Ok(())
    }
}

async fn run_scripts(connector: &dyn DatabaseConnector, scripts: &[String]) -> Result<(), FillError> {
    for script in scripts {
        connector
            .execute_raw_query(script)
            .await
            .map_err(|source| FillError::ScriptExecution {
                script: script.clone(),
                source,
            })?;
    }
    Ok(())
}
