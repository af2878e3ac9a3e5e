//! Fills the tables of a generation plan.
//!
//! The filler walks the tables in foreign key order. For each table it runs the
//! `before` scripts, drops the triggers if asked to, optionally empties the
//! table, then generates and inserts rows batch by batch before running the
//! `after` scripts and restoring the triggers.
//!
//! A skip request is honored between batches: the current table stops and the
//! next one starts.

use crate::order::fill_order;
use crate::progress::{step, ProgressEvent, ProgressListener};
use crate::trigger_guard::TriggerGuard;
use fill_core::{CustomizedSchema, CustomizedTable, DatabaseConnector, FillError};
use fill_generator::GeneratorRegistry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Cooperative request to skip the table being filled.
#[derive(Debug, Clone, Default)]
pub struct SkipHandle(Arc<AtomicBool>);

impl SkipHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the filler to move on to the next table.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillerState {
    Planning,
    Filling(String),
    Done,
}

/// Outcome of one table's fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    pub table: String,
    /// Rows the plan asked for
    pub requested: u64,
    pub generated: u64,
    /// Rows the database accepted
    pub inserted: u64,
    /// Rows of failed batches
    pub lost: u64,
    pub skipped: bool,
}

impl TableStats {
    /// Generated rows dropped by the database as duplicates.
    pub fn ignored(&self) -> u64 {
        self.generated
            .saturating_sub(self.inserted)
            .saturating_sub(self.lost)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillStats {
    pub tables: Vec<TableStats>,
}

impl FillStats {
    pub fn inserted(&self) -> u64 {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    pub fn get(&self, table: &str) -> Option<&TableStats> {
        self.tables.iter().find(|t| t.table == table)
    }
}

/// Drives generation and insertion for a whole plan.
pub struct Filler<'a> {
    connector: &'a dyn DatabaseConnector,
    plan: CustomizedSchema,
    registry: &'a GeneratorRegistry,
    progress: Arc<dyn ProgressListener>,
    skip: SkipHandle,
    rng: StdRng,
    state: FillerState,
}

impl<'a> Filler<'a> {
    pub fn new(
        connector: &'a dyn DatabaseConnector,
        plan: CustomizedSchema,
        registry: &'a GeneratorRegistry,
        progress: Arc<dyn ProgressListener>,
    ) -> Self {
        let seed = plan.settings.seed.unwrap_or_else(rand::random);
        info!("Using seed {seed}");
        Self {
            connector,
            plan,
            registry,
            progress,
            skip: SkipHandle::new(),
            rng: StdRng::seed_from_u64(seed),
            state: FillerState::Planning,
        }
    }

    /// Share a skip handle with another task, e.g. a key listener.
    pub fn with_skip_handle(mut self, skip: SkipHandle) -> Self {
        self.skip = skip;
        self
    }

    pub fn skip_handle(&self) -> SkipHandle {
        self.skip.clone()
    }

    pub fn state(&self) -> &FillerState {
        &self.state
    }

    pub fn plan(&self) -> &CustomizedSchema {
        &self.plan
    }

    /// Fill every table with rows to generate, or every table when `reset` is
    /// set, in foreign key order.
    pub async fn fill_tables(&mut self, reset: bool) -> Result<FillStats, FillError> {
        let order = fill_order(&self.plan.tables);
        let tables: Vec<CustomizedTable> = order
            .into_iter()
            .map(|i| self.plan.tables[i].clone())
            .filter(|t| reset || t.delta_rows > 0)
            .collect();
        info!(
            "Fill order: {}",
            tables
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut stats = FillStats::default();
        for table in &tables {
            self.state = FillerState::Filling(table.name.clone());
            // Requests made after the previous table's last batch are stale
            self.skip.take();
            stats.tables.push(self.fill_table(table, reset).await?);
        }
        self.state = FillerState::Done;
        info!("{} row(s) inserted", stats.inserted());
        Ok(stats)
    }

    async fn fill_table(
        &mut self,
        table: &CustomizedTable,
        reset: bool,
    ) -> Result<TableStats, FillError> {
        self.run_scripts(table, step::BEFORE, &table.before).await?;

        let guard = TriggerGuard::engage(self.connector, &table.name, table.disable_triggers).await?;
        let filled = self.fill_rows(table, reset).await;
        let filled = match filled {
            Ok(stats) => self
                .run_scripts(table, step::AFTER, &table.after)
                .await
                .map(|()| stats),
            Err(e) => Err(e),
        };
        guard.release().await;
        let stats = filled?;

        let mut done = ProgressEvent::done(&table.name, stats.generated, stats.requested);
        if stats.skipped {
            done = done.with_comment("skipped");
        } else if stats.ignored() > 0 {
            done = done.with_comment(format!("{} duplicate row(s) ignored", stats.ignored()));
        }
        self.progress.on_progress(&done);
        Ok(stats)
    }

    async fn fill_rows(
        &mut self,
        table: &CustomizedTable,
        reset: bool,
    ) -> Result<TableStats, FillError> {
        let mut stats = TableStats {
            table: table.name.clone(),
            requested: table.delta_rows,
            ..Default::default()
        };

        if reset {
            self.progress
                .on_progress(&ProgressEvent::running(&table.name, step::RESET, 0, 1));
            self.connector.empty_table(&table.name).await?;
        }
        if table.delta_rows == 0 {
            return Ok(stats);
        }

        let mut generator = self
            .registry
            .build_table(table, &self.plan.settings, &mut self.rng)?;
        generator.init(self.connector).await?;

        let batch_size = self.plan.settings.max_rows_per_batch.max(1);
        self.progress.on_progress(&ProgressEvent::running(
            &table.name,
            step::GENERATE,
            0,
            table.delta_rows,
        ));

        while stats.generated < table.delta_rows {
            if self.skip.take() {
                info!("Skipping {}", table.name);
                stats.skipped = true;
                break;
            }
            let count = batch_size.min(table.delta_rows - stats.generated);
            let rows = generator.next_batch(count)?;
            match self.connector.insert(&table.name, &rows).await {
                Ok(inserted) => {
                    stats.inserted += inserted;
                    if inserted < count {
                        warn!(
                            "{}: {} duplicate row(s) ignored in batch",
                            table.name,
                            count - inserted
                        );
                    }
                }
                Err(e) => {
                    error!("{}: failed to insert batch of {count} row(s): {e}", table.name);
                    stats.lost += count;
                }
            }
            stats.generated += count;
            self.progress.on_progress(&ProgressEvent::running(
                &table.name,
                step::GENERATE,
                stats.generated,
                table.delta_rows,
            ));
        }
        Ok(stats)
    }

    async fn run_scripts(
        &self,
        table: &CustomizedTable,
        step: &str,
        scripts: &[String],
    ) -> Result<(), FillError> {
        let total = scripts.len() as u64;
        for (i, script) in scripts.iter().enumerate() {
            self.progress
                .on_progress(&ProgressEvent::running(&table.name, step, i as u64, total));
            self.connector
                .execute_raw_query(script)
                .await
                .map_err(|source| FillError::ScriptExecution {
                    script: script.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
