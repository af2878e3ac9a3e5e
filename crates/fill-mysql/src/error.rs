//! Error types for the MySQL connector.

use fill_core::{ConnectorError, Engine};
use thiserror::Error;

/// Errors that can occur while talking to MariaDB/MySQL.
#[derive(Error, Debug)]
pub enum MySQLConnectorError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// Malformed connection URI.
    #[error("Invalid MySQL URI: {0}")]
    Url(#[from] mysql_async::UrlError),

    /// The URI does not name a database.
    #[error("Please specify a database name in the connection URI")]
    MissingDatabase,

    /// A catalog row lacks an expected field.
    #[error("Missing {field} in {query} result")]
    MissingField {
        field: &'static str,
        query: &'static str,
    },

    /// Trigger backup store failure.
    #[error("Trigger backup error: {0:#}")]
    TriggerBackup(#[from] anyhow::Error),
}

impl From<MySQLConnectorError> for ConnectorError {
    fn from(e: MySQLConnectorError) -> Self {
        match e {
            MySQLConnectorError::MissingDatabase | MySQLConnectorError::Url(_) => {
                ConnectorError::Connection(e.to_string())
            }
            MySQLConnectorError::TriggerBackup(e) => ConnectorError::TriggerBackup(format!("{e:#}")),
            other => ConnectorError::database(Engine::MariaDb, other),
        }
    }
}
