//! Error types for the PostgreSQL connector.

use fill_core::{ConnectorError, Engine};
use thiserror::Error;

/// Errors that can occur while talking to PostgreSQL.
#[derive(Error, Debug)]
pub enum PostgreSQLConnectorError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// The URI does not name a database.
    #[error("Please specify a database name in the connection URI")]
    MissingDatabase,

    /// Trigger backup store failure.
    #[error("Trigger backup error: {0:#}")]
    TriggerBackup(#[from] anyhow::Error),
}

impl From<PostgreSQLConnectorError> for ConnectorError {
    fn from(e: PostgreSQLConnectorError) -> Self {
        match e {
            PostgreSQLConnectorError::MissingDatabase => ConnectorError::Connection(e.to_string()),
            PostgreSQLConnectorError::TriggerBackup(e) => {
                ConnectorError::TriggerBackup(format!("{e:#}"))
            }
            other => ConnectorError::database(Engine::Postgres, other),
        }
    }
}
