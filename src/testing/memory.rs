//! In-memory [`DatabaseConnector`] for tests.
//!
//! Tables come from a [`Schema`]. Inserts follow the insert-ignore contract:
//! a row whose unique or auto increment value already exists is dropped.
//! Triggers are simulated by name and backed up through a real
//! [`TriggerBackup`], so the backup store behaves as with a live database.

use async_trait::async_trait;
use fill_core::{
    Column, ConnectorError, DatabaseConnector, Engine, ForeignKeyInfo, ForeignKeyQuery,
    GeneratedValue, Row, Schema, Table,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};
use trigger_backup::{MemoryStore, TriggerBackup, TriggerDefinition, TriggerKey, TriggerStore};

/// Schema name reported for simulated triggers.
pub const MEMORY_SCHEMA: &str = "memory";

#[derive(Default)]
struct State {
    rows: HashMap<String, Vec<Row>>,
    next_id: HashMap<String, i64>,
    /// Triggers currently present in the simulated database
    installed: BTreeMap<TriggerKey, TriggerDefinition>,
    queries: Vec<String>,
    failing_queries: Vec<String>,
    failing_inserts: HashSet<String>,
    failing_restores: HashSet<String>,
}

pub struct MemoryConnector {
    engine: Engine,
    schema: Schema,
    triggers: TriggerBackup,
    state: Mutex<State>,
}

impl MemoryConnector {
    /// Connector over `schema` with an in-memory trigger backup.
    pub async fn new(schema: Schema) -> anyhow::Result<Self> {
        Self::with_store(schema, MemoryStore::new()).await
    }

    pub async fn with_store(schema: Schema, store: impl TriggerStore + 'static) -> anyhow::Result<Self> {
        Ok(Self {
            engine: Engine::MariaDb,
            schema,
            triggers: TriggerBackup::open(store).await?,
            state: Mutex::new(State::default()),
        })
    }

    /// Report another engine, e.g. to exercise engine-restricted kinds.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn table(&self, name: &str) -> Result<&Table, ConnectorError> {
        self.schema
            .get_table(name)
            .ok_or_else(|| ConnectorError::TableNotFound(name.to_string()))
    }

    /// Install a `BEFORE INSERT` trigger on `table`.
    pub fn add_trigger(&self, table: &str, name: &str) {
        let definition = TriggerDefinition {
            name: name.to_string(),
            schema: MEMORY_SCHEMA.to_string(),
            table_schema: MEMORY_SCHEMA.to_string(),
            table: table.to_string(),
            timing: "BEFORE".to_string(),
            event: "INSERT".to_string(),
            statement: format!("SET NEW.touched_by = '{name}'"),
            definer: None,
            dropped: false,
        };
        self.lock().installed.insert(definition.key(), definition);
    }

    /// Names of the triggers currently installed on `table`.
    pub fn installed_triggers(&self, table: &str) -> Vec<String> {
        self.lock()
            .installed
            .values()
            .filter(|t| t.table == table)
            .map(|t| t.name.clone())
            .collect()
    }

    pub fn trigger_backup(&self) -> &TriggerBackup {
        &self.triggers
    }

    /// Make every raw query containing `pattern` fail.
    pub fn fail_queries_containing(&self, pattern: &str) {
        self.lock().failing_queries.push(pattern.to_string());
    }

    /// Make every insert into `table` fail.
    pub fn fail_inserts(&self, table: &str) {
        self.lock().failing_inserts.insert(table.to_string());
    }

    /// Make restoring the triggers of `table` fail.
    pub fn fail_trigger_restore(&self, table: &str) {
        self.lock().failing_restores.insert(table.to_string());
    }

    /// Raw queries executed so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    /// Values of one column, in insertion order.
    pub fn column_values(&self, table: &str, column: &str) -> Vec<GeneratedValue> {
        self.rows(table)
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(GeneratedValue::Null))
            .collect()
    }

    fn insert_rows(&self, table: &str, rows: &[Row]) -> Result<u64, ConnectorError> {
        let definition = self.table(table)?;
        let mut state = self.lock();
        if state.failing_inserts.contains(table) {
            return Err(ConnectorError::database(
                self.engine,
                format!("insert into {table} rejected"),
            ));
        }
        if let Some(unknown) = rows
            .iter()
            .flat_map(|row| row.columns())
            .find(|c| definition.get_column(c).is_none())
        {
            return Err(ConnectorError::database(
                self.engine,
                format!("Unknown column '{unknown}' in {table}"),
            ));
        }

        let keys: Vec<&Column> = definition
            .columns
            .iter()
            .filter(|c| c.unique || c.auto_increment)
            .collect();
        let mut inserted = 0;
        for row in rows {
            let mut row = row.clone();
            for column in definition.columns.iter().filter(|c| c.auto_increment) {
                let next = state.next_id.entry(table.to_string()).or_insert(1);
                match row.get(&column.name).and_then(GeneratedValue::as_i64) {
                    Some(id) => *next = (*next).max(id + 1),
                    None => {
                        row.push(column.name.clone(), GeneratedValue::Int64(*next));
                        *next += 1;
                    }
                }
            }

            let existing = state.rows.entry(table.to_string()).or_default();
            let conflict = keys.iter().any(|column| match row.get(&column.name) {
                Some(value) if !value.is_null() => existing
                    .iter()
                    .any(|other| other.get(&column.name) == Some(value)),
                _ => false,
            });
            if conflict {
                continue;
            }
            existing.push(row);
            inserted += 1;
        }
        Ok(inserted)
    }

    fn foreign_values(&self, query: &ForeignKeyQuery) -> Result<Vec<GeneratedValue>, ConnectorError> {
        self.table(&query.foreign_table)?;
        let condition = query
            .condition
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| parse_condition(self.engine, c))
            .transpose()?;

        let state = self.lock();
        let used: Vec<&GeneratedValue> = if query.unique {
            state
                .rows
                .get(&query.table)
                .map(|rows| rows.iter().filter_map(|r| r.get(&query.column)).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut values: Vec<GeneratedValue> = Vec::new();
        for row in state.rows.get(&query.foreign_table).into_iter().flatten() {
            if values.len() as u64 >= query.limit {
                break;
            }
            if let Some((column, expected)) = &condition {
                if row.get(column).is_none_or(|v| v.to_string() != *expected) {
                    continue;
                }
            }
            let Some(value) = row.get(&query.foreign_column).filter(|v| !v.is_null()) else {
                continue;
            };
            if used.contains(&value) || values.contains(value) {
                continue;
            }
            values.push(value.clone());
        }
        Ok(values)
    }
}

/// Parse a `column = value` condition, the only form the memory engine knows.
fn parse_condition(engine: Engine, condition: &str) -> Result<(String, String), ConnectorError> {
    let (column, value) = condition.split_once('=').ok_or_else(|| {
        ConnectorError::database(engine, format!("Unsupported condition: {condition}"))
    })?;
    let value = value.trim();
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value);
    Ok((column.trim().to_string(), value.to_string()))
}

#[async_trait]
impl DatabaseConnector for MemoryConnector {
    fn engine(&self) -> Engine {
        self.engine
    }

    async fn init(&self) -> Result<(), ConnectorError> {
        debug!("Memory connector with {} table(s)", self.schema.tables.len());
        Ok(())
    }

    async fn destroy(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn count_lines(&self, table: &str) -> Result<u64, ConnectorError> {
        self.table(table)?;
        Ok(self.lock().rows.get(table).map_or(0, Vec::len) as u64)
    }

    async fn empty_table(&self, table: &str) -> Result<(), ConnectorError> {
        self.table(table)?;
        let mut state = self.lock();
        state.rows.remove(table);
        state.next_id.remove(table);
        Ok(())
    }

    async fn execute_raw_query(&self, query: &str) -> Result<(), ConnectorError> {
        let mut state = self.lock();
        state.queries.push(query.to_string());
        if state.failing_queries.iter().any(|p| query.contains(p.as_str())) {
            return Err(ConnectorError::database(
                self.engine,
                format!("query failed: {query}"),
            ));
        }
        Ok(())
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<u64, ConnectorError> {
        self.insert_rows(table, rows)
    }

    async fn get_tables_information(&self) -> Result<Vec<Table>, ConnectorError> {
        Ok(self
            .schema
            .tables
            .iter()
            .map(|t| Table::new(&t.name, Vec::new()))
            .collect())
    }

    async fn get_columns_information(&self, table: &str) -> Result<Vec<Column>, ConnectorError> {
        Ok(self
            .table(table)?
            .columns
            .iter()
            .cloned()
            .map(|mut column| {
                column.foreign_key = None;
                column
            })
            .collect())
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, ConnectorError> {
        Ok(self
            .table(table)?
            .columns
            .iter()
            .filter_map(|column| {
                column.foreign_key.as_ref().map(|fk| ForeignKeyInfo {
                    column: column.name.clone(),
                    foreign_table: fk.table.clone(),
                    foreign_column: fk.column.clone(),
                    unique_index: column.unique,
                    composite: fk.composite,
                })
            })
            .collect())
    }

    async fn get_values_for_foreign_keys(
        &self,
        query: &ForeignKeyQuery,
    ) -> Result<Vec<GeneratedValue>, ConnectorError> {
        self.foreign_values(query)
    }

    async fn backup_triggers(&self, tables: &[String]) -> Result<(), ConnectorError> {
        let definitions: Vec<TriggerDefinition> = self
            .lock()
            .installed
            .values()
            .filter(|t| tables.contains(&t.table))
            .cloned()
            .collect();
        info!("Backing up {} trigger(s)", definitions.len());
        self.triggers
            .record(definitions)
            .await
            .map_err(|e| ConnectorError::TriggerBackup(e.to_string()))
    }

    async fn clean_backup_triggers(&self) -> Result<(), ConnectorError> {
        self.triggers
            .clean()
            .await
            .map(|_| ())
            .map_err(|e| ConnectorError::TriggerBackup(e.to_string()))
    }

    async fn disable_triggers(&self, table: &str) -> Result<(), ConnectorError> {
        let definitions = self.triggers.for_table(MEMORY_SCHEMA, table).await;
        if definitions.is_empty() {
            return Ok(());
        }
        let keys: Vec<TriggerKey> = definitions.iter().map(TriggerDefinition::key).collect();
        self.triggers
            .mark_dropped(&keys)
            .await
            .map_err(|e| ConnectorError::TriggerBackup(e.to_string()))?;

        let mut state = self.lock();
        for key in &keys {
            state.installed.remove(key);
        }
        Ok(())
    }

    async fn enable_triggers(&self, table: &str) -> Result<(), ConnectorError> {
        let definitions = self.triggers.for_table(MEMORY_SCHEMA, table).await;
        let restored: Vec<TriggerKey> = {
            let mut state = self.lock();
            let failing = state.failing_restores.contains(table);
            let mut restored = Vec::new();
            for definition in definitions {
                if failing {
                    error!("Failed to restore trigger {} on {table}", definition.name);
                    continue;
                }
                let key = definition.key();
                state.installed.insert(
                    key.clone(),
                    TriggerDefinition {
                        dropped: false,
                        ..definition
                    },
                );
                restored.push(key);
            }
            restored
        };
        self.triggers
            .mark_restored(&restored)
            .await
            .map_err(|e| ConnectorError::TriggerBackup(e.to_string()))
    }
}
