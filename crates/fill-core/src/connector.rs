//! Database connector interface consumed by the generation core.

use crate::error::ConnectorError;
use crate::schema::{Column, Schema, Table};
use crate::values::{GeneratedValue, Row};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Tables introspected concurrently by [`DatabaseConnector::get_schema`].
pub const INTROSPECTION_CONCURRENCY: usize = 8;

/// Database engine behind a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// MariaDB and MySQL
    MariaDb,
    Postgres,
}

impl Engine {
    /// Resolve the engine from a connection URI scheme.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "mysql" | "mariadb" => Some(Engine::MariaDb),
            "postgres" | "postgresql" => Some(Engine::Postgres),
            _ => None,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::MariaDb => f.write_str("MariaDB"),
            Engine::Postgres => f.write_str("PostgreSQL"),
        }
    }
}

/// A foreign key found by introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    /// Referencing column
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
    /// The referencing column carries a single-column unique index
    pub unique_index: bool,
    /// The constraint spans several columns
    pub composite: bool,
}

/// Parameters of a foreign key candidate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyQuery {
    /// Owning table
    pub table: String,
    /// Owning column
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
    pub limit: u64,
    /// Exclude values the owning column already references
    pub unique: bool,
    /// Raw SQL condition on the foreign table
    pub condition: Option<String>,
}

/// Alias of the owning table in the unique foreign key lookup.
const OWNER_ALIAS: &str = "datafill_owner";

impl ForeignKeyQuery {
    /// Render the candidate lookup with the engine's identifier quoting.
    ///
    /// ```text
    /// SELECT DISTINCT ft.fc FROM ft
    ///   [LEFT JOIN t AS owner ON owner.c = ft.fc]
    /// WHERE ft.fc IS NOT NULL [AND owner.c IS NULL] [AND (condition)]
    /// LIMIT n
    /// ```
    pub fn to_sql(&self, quote: impl Fn(&str) -> String) -> String {
        let foreign = format!("{}.{}", quote(&self.foreign_table), quote(&self.foreign_column));
        let mut sql = format!("SELECT DISTINCT {foreign} FROM {}", quote(&self.foreign_table));
        if self.unique {
            sql.push_str(&format!(
                " LEFT JOIN {} AS {OWNER_ALIAS} ON {OWNER_ALIAS}.{} = {foreign}",
                quote(&self.table),
                quote(&self.column)
            ));
        }
        sql.push_str(&format!(" WHERE {foreign} IS NOT NULL"));
        if self.unique {
            sql.push_str(&format!(" AND {OWNER_ALIAS}.{} IS NULL", quote(&self.column)));
        }
        if let Some(condition) = self.condition.as_deref().filter(|c| !c.trim().is_empty()) {
            sql.push_str(&format!(" AND ({condition})"));
        }
        sql.push_str(&format!(" LIMIT {}", self.limit));
        sql
    }
}

/// Engine-specific database access used by analysis and filling.
///
/// Implementations normalize every catalog record into [`Column`] so that the
/// generation core never branches on the engine.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    fn engine(&self) -> Engine;

    /// Log the session settings applied to every pooled connection.
    async fn init(&self) -> Result<(), ConnectorError>;

    /// Close every pooled connection.
    async fn destroy(&self) -> Result<(), ConnectorError>;

    async fn count_lines(&self, table: &str) -> Result<u64, ConnectorError>;

    /// Delete every row and reset the auto increment / identity counter.
    async fn empty_table(&self, table: &str) -> Result<(), ConnectorError>;

    async fn execute_raw_query(&self, query: &str) -> Result<(), ConnectorError>;

    /// Insert rows, skipping rows that conflict with a unique constraint.
    ///
    /// Returns the number of rows actually inserted.
    async fn insert(&self, table: &str, rows: &[Row]) -> Result<u64, ConnectorError>;

    /// Tables of the target schema, without columns.
    async fn get_tables_information(&self) -> Result<Vec<Table>, ConnectorError>;

    async fn get_columns_information(&self, table: &str) -> Result<Vec<Column>, ConnectorError>;

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, ConnectorError>;

    /// Distinct candidate values for a foreign key column.
    async fn get_values_for_foreign_keys(
        &self,
        query: &ForeignKeyQuery,
    ) -> Result<Vec<GeneratedValue>, ConnectorError>;

    /// Persist the definitions of every trigger on the given tables.
    async fn backup_triggers(&self, tables: &[String]) -> Result<(), ConnectorError>;

    /// Delete the trigger backup store.
    async fn clean_backup_triggers(&self) -> Result<(), ConnectorError>;

    /// Drop the backed-up triggers of a table.
    async fn disable_triggers(&self, table: &str) -> Result<(), ConnectorError>;

    /// Recreate the backed-up triggers of a table.
    ///
    /// Failures to recreate a single trigger are logged and the remaining
    /// triggers are still restored.
    async fn enable_triggers(&self, table: &str) -> Result<(), ConnectorError>;

    /// Introspect the whole schema.
    ///
    /// Columns and foreign keys are fetched for up to
    /// [`INTROSPECTION_CONCURRENCY`] tables at a time.
    async fn get_schema(&self) -> Result<Schema, ConnectorError> {
        let tables = self.get_tables_information().await?;
        let tables: Vec<Table> = futures::stream::iter(tables)
            .map(|mut table| async move {
                info!("Analysing table: {}", table.name);
                table.columns = self.get_columns_information(&table.name).await?;
                let foreign_keys = self.get_foreign_keys(&table.name).await?;
                table.apply_foreign_keys(&foreign_keys);
                Ok::<Table, ConnectorError>(table)
            })
            .buffered(INTROSPECTION_CONCURRENCY)
            .try_collect()
            .await?;
        Ok(Schema::new(tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_scheme() {
        assert_eq!(Engine::from_scheme("mysql"), Some(Engine::MariaDb));
        assert_eq!(Engine::from_scheme("mariadb"), Some(Engine::MariaDb));
        assert_eq!(Engine::from_scheme("postgres"), Some(Engine::Postgres));
        assert_eq!(Engine::from_scheme("sqlite"), None);
    }

    fn query(unique: bool, condition: Option<&str>) -> ForeignKeyQuery {
        ForeignKeyQuery {
            table: "orders".to_string(),
            column: "customer_id".to_string(),
            foreign_table: "customers".to_string(),
            foreign_column: "id".to_string(),
            limit: 10,
            unique,
            condition: condition.map(str::to_string),
        }
    }

    fn backtick(ident: &str) -> String {
        format!("`{ident}`")
    }

    #[test]
    fn test_foreign_key_sql_plain() {
        assert_eq!(
            query(false, None).to_sql(backtick),
            "SELECT DISTINCT `customers`.`id` FROM `customers` WHERE `customers`.`id` IS NOT NULL LIMIT 10"
        );
    }

    #[test]
    fn test_foreign_key_sql_unique_with_condition() {
        let sql = query(true, Some("active = 1")).to_sql(backtick);
        assert_eq!(
            sql,
            "SELECT DISTINCT `customers`.`id` FROM `customers` \
             LEFT JOIN `orders` AS datafill_owner ON datafill_owner.`customer_id` = `customers`.`id` \
             WHERE `customers`.`id` IS NOT NULL AND datafill_owner.`customer_id` IS NULL \
             AND (active = 1) LIMIT 10"
        );
    }
}
