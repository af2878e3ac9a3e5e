//! PostgreSQL implementation of [`DatabaseConnector`].

use crate::error::PostgreSQLConnectorError;
use crate::triggers::{create_trigger_sql, drop_trigger_sql, LIST_TRIGGERS_SQL};
use crate::types::{column_from_catalog, CatalogColumn};
use crate::value::{quote_literal, to_literal};
use async_trait::async_trait;
use fill_core::{
    Column, ConnectorError, DatabaseConnector, Engine, ForeignKeyInfo, ForeignKeyQuery,
    GeneratedValue, Row, Table,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};
use tracing::{debug, error, info, warn};
use trigger_backup::{TriggerBackup, TriggerDefinition};

/// Schema filled when none is given.
pub const DEFAULT_SCHEMA: &str = "public";

const COLUMNS_QUERY: &str = "SELECT c.column_name::text, c.data_type::text, c.udt_name::text, \
     c.is_nullable::text, c.column_default::text, c.is_identity::text, \
     c.character_maximum_length::int8, c.numeric_precision::int8, \
     EXISTS (SELECT 1 FROM information_schema.table_constraints tc \
        JOIN information_schema.key_column_usage k \
          ON k.constraint_schema = tc.constraint_schema \
         AND k.constraint_name = tc.constraint_name \
         AND k.table_name = tc.table_name \
        WHERE tc.table_schema = c.table_schema \
          AND tc.table_name = c.table_name \
          AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE') \
          AND k.column_name = c.column_name \
          AND (SELECT COUNT(*) FROM information_schema.key_column_usage k2 \
                WHERE k2.constraint_schema = tc.constraint_schema \
                  AND k2.constraint_name = tc.constraint_name \
                  AND k2.table_name = tc.table_name) = 1) \
     FROM information_schema.columns c \
     WHERE c.table_schema = $1 AND c.table_name = $2 \
     ORDER BY c.ordinal_position";

const FOREIGN_KEYS_QUERY: &str = "SELECT a.attname::text, ft.relname::text, fa.attname::text, \
     cardinality(con.conkey) > 1, \
     EXISTS (SELECT 1 FROM pg_index i \
        WHERE i.indrelid = con.conrelid AND i.indisunique \
          AND i.indnatts = 1 AND i.indkey[0] = k.attnum) \
     FROM pg_constraint con \
     JOIN pg_class t ON t.oid = con.conrelid \
     JOIN pg_namespace n ON n.oid = t.relnamespace \
     JOIN pg_class ft ON ft.oid = con.confrelid \
     CROSS JOIN LATERAL unnest(con.conkey, con.confkey) AS k(attnum, fattnum) \
     JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum \
     JOIN pg_attribute fa ON fa.attrelid = con.confrelid AND fa.attnum = k.fattnum \
     WHERE con.contype = 'f' AND n.nspname = $1 AND t.relname = $2 \
     ORDER BY con.conname";

/// Quote an identifier with double quotes.
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Delete every row then rewind the sequences owned by the table's columns.
fn empty_table_sql(table: &str) -> String {
    let quoted = quote(table);
    let regclass = quote_literal(&quoted);
    format!(
        "DELETE FROM {quoted}; \
         SELECT setval(s.seq::regclass, 1, false) FROM ( \
            SELECT pg_get_serial_sequence({regclass}, a.attname::text) AS seq \
            FROM pg_attribute a \
            WHERE a.attrelid = {regclass}::regclass AND a.attnum > 0 AND NOT a.attisdropped \
         ) s WHERE s.seq IS NOT NULL"
    )
}

fn insert_sql(table: &str, rows: &[Row]) -> Option<String> {
    let first = rows.first()?;
    let columns: Vec<String> = first.columns().map(quote).collect();
    if columns.is_empty() {
        return None;
    }
    let values: Vec<String> = rows
        .iter()
        .map(|row| {
            let literals: Vec<String> = row.values().map(to_literal).collect();
            format!("({})", literals.join(", "))
        })
        .collect();
    Some(format!(
        "INSERT INTO {} ({}) VALUES {} ON CONFLICT DO NOTHING",
        quote(table),
        columns.join(", "),
        values.join(", ")
    ))
}

/// Connector for PostgreSQL.
///
/// The session runs with `session_replication_role = replica`, which skips
/// foreign key checks and triggers for this connection.
pub struct PostgreSQLConnector {
    client: Arc<Mutex<Client>>,
    schema: String,
    triggers: TriggerBackup,
}

impl PostgreSQLConnector {
    /// Connect to the database named in `uri` and fill `schema`.
    pub async fn connect(
        uri: &str,
        schema: Option<&str>,
        triggers: TriggerBackup,
    ) -> Result<Self, PostgreSQLConnectorError> {
        let config: Config = uri.parse()?;
        if config.get_dbname().is_none_or(str::is_empty) {
            return Err(PostgreSQLConnectorError::MissingDatabase);
        }
        let (client, connection) = config.connect(NoTls).await?;

        // Spawn the connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {e}");
            }
        });

        let schema = schema.unwrap_or(DEFAULT_SCHEMA).to_string();
        client
            .batch_execute(&format!(
                "SET search_path TO {}; SET enable_seqscan = off",
                quote(&schema)
            ))
            .await?;
        if let Err(e) = client
            .batch_execute("SET session_replication_role = replica")
            .await
        {
            warn!("Could not set session_replication_role, foreign keys stay enforced: {e}");
        }

        Ok(Self {
            client: Arc::new(Mutex::new(client)),
            schema,
            triggers,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn count(&self, table: &str) -> Result<u64, PostgreSQLConnectorError> {
        let client = self.client.lock().await;
        let row = client
            .query_one(&format!("SELECT COUNT(*) FROM {}", quote(table)), &[])
            .await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    async fn batch(&self, sql: &str) -> Result<(), PostgreSQLConnectorError> {
        let client = self.client.lock().await;
        client.batch_execute(sql).await?;
        Ok(())
    }

    async fn insert_rows(&self, table: &str, rows: &[Row]) -> Result<u64, PostgreSQLConnectorError> {
        let Some(sql) = insert_sql(table, rows) else {
            return Ok(0);
        };
        let client = self.client.lock().await;
        Ok(client.execute(sql.as_str(), &[]).await?)
    }

    async fn tables(&self) -> Result<Vec<Table>, PostgreSQLConnectorError> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[&self.schema],
            )
            .await?;
        rows.iter()
            .map(|row| -> Result<Table, PostgreSQLConnectorError> {
                Ok(Table::new(row.try_get::<_, String>(0)?, Vec::new()))
            })
            .collect()
    }

    async fn columns(&self, table: &str) -> Result<Vec<Column>, PostgreSQLConnectorError> {
        let client = self.client.lock().await;
        let rows = client.query(COLUMNS_QUERY, &[&self.schema, &table]).await?;
        rows.iter()
            .map(|row| -> Result<Column, PostgreSQLConnectorError> {
                let catalog = CatalogColumn {
                    name: row.try_get(0)?,
                    data_type: row.try_get::<_, Option<String>>(1)?.unwrap_or_default(),
                    udt_name: row.try_get::<_, Option<String>>(2)?.unwrap_or_default(),
                    is_nullable: row.try_get::<_, Option<String>>(3)?.as_deref() == Some("YES"),
                    column_default: row.try_get(4)?,
                    is_identity: row.try_get::<_, Option<String>>(5)?.as_deref() == Some("YES"),
                    character_maximum_length: row.try_get(6)?,
                    numeric_precision: row.try_get(7)?,
                    unique: row.try_get::<_, Option<bool>>(8)?.unwrap_or(false),
                };
                Ok(column_from_catalog(&catalog))
            })
            .collect()
    }

    async fn foreign_keys(
        &self,
        table: &str,
    ) -> Result<Vec<ForeignKeyInfo>, PostgreSQLConnectorError> {
        let client = self.client.lock().await;
        let rows = client
            .query(FOREIGN_KEYS_QUERY, &[&self.schema, &table])
            .await?;
        rows.iter()
            .map(|row| -> Result<ForeignKeyInfo, PostgreSQLConnectorError> {
                Ok(ForeignKeyInfo {
                    column: row.try_get(0)?,
                    foreign_table: row.try_get(1)?,
                    foreign_column: row.try_get(2)?,
                    composite: row.try_get::<_, Option<bool>>(3)?.unwrap_or(false),
                    unique_index: row.try_get::<_, Option<bool>>(4)?.unwrap_or(false),
                })
            })
            .collect()
    }

    /// Candidate values are read through the simple query protocol, as text.
    async fn foreign_values(
        &self,
        query: &ForeignKeyQuery,
    ) -> Result<Vec<GeneratedValue>, PostgreSQLConnectorError> {
        let sql = query.to_sql(quote);
        debug!("Foreign key lookup: {sql}");
        let client = self.client.lock().await;
        let messages = client.simple_query(&sql).await?;
        Ok(messages
            .iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(
                    row.get(0)
                        .map_or(GeneratedValue::Null, GeneratedValue::from),
                ),
                _ => None,
            })
            .collect())
    }

    async fn triggers_of(
        &self,
        tables: &[String],
    ) -> Result<Vec<TriggerDefinition>, PostgreSQLConnectorError> {
        if tables.is_empty() {
            return Ok(Vec::new());
        }
        let client = self.client.lock().await;
        let rows = client
            .query(LIST_TRIGGERS_SQL, &[&self.schema, &tables])
            .await?;
        rows.iter()
            .map(|row| -> Result<TriggerDefinition, PostgreSQLConnectorError> {
                let schema: String = row.try_get(0)?;
                Ok(TriggerDefinition {
                    name: row.try_get(1)?,
                    table_schema: schema.clone(),
                    schema,
                    table: row.try_get(2)?,
                    timing: row.try_get(3)?,
                    event: row.try_get(4)?,
                    statement: row.try_get(5)?,
                    definer: None,
                    dropped: false,
                })
            })
            .collect()
    }

    async fn drop_triggers(&self, table: &str) -> Result<(), PostgreSQLConnectorError> {
        let triggers = self.triggers.for_table(&self.schema, table).await;
        if triggers.is_empty() {
            return Ok(());
        }
        // Flag first so a crash mid-drop still restores them next run
        let keys: Vec<_> = triggers.iter().map(TriggerDefinition::key).collect();
        self.triggers.mark_dropped(&keys).await?;

        let client = self.client.lock().await;
        for trigger in &triggers {
            match client.batch_execute(&drop_trigger_sql(trigger)).await {
                Ok(()) => info!("Dropped trigger {} on {table}", trigger.name),
                Err(e) => error!("Failed to drop trigger {} on {table}: {e}", trigger.name),
            }
        }
        Ok(())
    }

    async fn restore_triggers(&self, table: &str) -> Result<(), PostgreSQLConnectorError> {
        let triggers = self.triggers.for_table(&self.schema, table).await;
        if triggers.is_empty() {
            return Ok(());
        }
        let mut restored = Vec::new();
        {
            let client = self.client.lock().await;
            for trigger in &triggers {
                let sql = format!("{}; {}", drop_trigger_sql(trigger), create_trigger_sql(trigger));
                match client.batch_execute(&sql).await {
                    Ok(()) => {
                        info!("Restored trigger {} on {table}", trigger.name);
                        restored.push(trigger.key());
                    }
                    Err(e) => error!("Failed to restore trigger {} on {table}: {e}", trigger.name),
                }
            }
        }
        self.triggers.mark_restored(&restored).await?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseConnector for PostgreSQLConnector {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    async fn init(&self) -> Result<(), ConnectorError> {
        warn!("For performance session_replication_role is set to replica during insert.");
        warn!("It is set per connection and should not alter your configuration.");
        info!("Filling schema {}", self.schema);
        Ok(())
    }

    async fn destroy(&self) -> Result<(), ConnectorError> {
        // The connection task ends once the client is dropped
        Ok(())
    }

    async fn count_lines(&self, table: &str) -> Result<u64, ConnectorError> {
        Ok(self.count(table).await?)
    }

    async fn empty_table(&self, table: &str) -> Result<(), ConnectorError> {
        Ok(self.batch(&empty_table_sql(table)).await?)
    }

    async fn execute_raw_query(&self, query: &str) -> Result<(), ConnectorError> {
        Ok(self.batch(query).await?)
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<u64, ConnectorError> {
        Ok(self.insert_rows(table, rows).await?)
    }

    async fn get_tables_information(&self) -> Result<Vec<Table>, ConnectorError> {
        Ok(self.tables().await?)
    }

    async fn get_columns_information(&self, table: &str) -> Result<Vec<Column>, ConnectorError> {
        Ok(self.columns(table).await?)
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, ConnectorError> {
        Ok(self.foreign_keys(table).await?)
    }

    async fn get_values_for_foreign_keys(
        &self,
        query: &ForeignKeyQuery,
    ) -> Result<Vec<GeneratedValue>, ConnectorError> {
        Ok(self.foreign_values(query).await?)
    }

    async fn backup_triggers(&self, tables: &[String]) -> Result<(), ConnectorError> {
        let triggers = self.triggers_of(tables).await?;
        info!("Backing up {} trigger(s)", triggers.len());
        self.triggers
            .record(triggers)
            .await
            .map_err(PostgreSQLConnectorError::from)?;
        Ok(())
    }

    async fn clean_backup_triggers(&self) -> Result<(), ConnectorError> {
        self.triggers
            .clean()
            .await
            .map_err(PostgreSQLConnectorError::from)?;
        Ok(())
    }

    async fn disable_triggers(&self, table: &str) -> Result<(), ConnectorError> {
        Ok(self.drop_triggers(table).await?)
    }

    async fn enable_triggers(&self, table: &str) -> Result<(), ConnectorError> {
        Ok(self.restore_triggers(table).await?)
    }
}
