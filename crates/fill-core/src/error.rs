//! Error types shared by the generation core and the connectors.

use crate::connector::Engine;
use thiserror::Error;

/// A column whose generator configuration is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{table}.{column}: {message}")]
pub struct GeneratorConfigError {
    pub table: String,
    pub column: String,
    pub message: String,
}

impl GeneratorConfigError {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by a [`DatabaseConnector`](crate::DatabaseConnector).
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The connection URI names an engine no connector handles.
    #[error("Unsupported engine {0}")]
    UnsupportedEngine(String),

    /// Connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query failed on the database.
    #[error("{engine} error: {source}")]
    Database {
        engine: Engine,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Trigger backup store could not be read or written.
    #[error("Trigger backup error: {0}")]
    TriggerBackup(String),

    /// Table unknown to the connector.
    #[error("Table '{0}' not found")]
    TableNotFound(String),
}

impl ConnectorError {
    pub fn database(
        engine: Engine,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Database {
            engine,
            source: source.into(),
        }
    }
}

/// Errors raised while planning or filling.
#[derive(Error, Debug)]
pub enum FillError {
    /// Bad or missing connection target or settings file.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The schema or customization fails structural checks.
    #[error("Validation failed:\n{}", bullet_list(.0))]
    Validation(Vec<String>),

    /// One or more columns have an unusable generator configuration.
    #[error("Invalid generator configuration:\n{}", bullet_list(.0))]
    GeneratorConfig(Vec<GeneratorConfigError>),

    /// Not enough distinct unused foreign values for a unique column.
    #[error("Not enough FK for column: {0}")]
    ForeignKeyExhaustion(String),

    /// Not enough distinct values for a unique `values` column.
    #[error("Not enough values for column: {0}")]
    ValuesExhaustion(String),

    /// A before/after/global script failed.
    #[error("Script failed: {script}")]
    ScriptExecution {
        script: String,
        #[source]
        source: ConnectorError,
    },

    /// Any other connector failure.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

fn bullet_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_config_error_lists_every_column() {
        let err = FillError::GeneratorConfig(vec![
            GeneratorConfigError::new("orders", "total", "min and max are required"),
            GeneratorConfigError::new("orders", "code", "No generator defined"),
        ]);
        let message = err.to_string();
        assert!(message.contains("orders.total: min and max are required"));
        assert!(message.contains("orders.code: No generator defined"));
    }

    #[test]
    fn test_exhaustion_names_column() {
        let err = FillError::ForeignKeyExhaustion("orders.customer_id".to_string());
        assert_eq!(err.to_string(), "Not enough FK for column: orders.customer_id");
    }
}
