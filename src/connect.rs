use crate::settings::Settings;
use anyhow::Context;
use fill_core::{ConnectorError, DatabaseConnector, Engine};
use fill_mysql::MySQLConnector;
use fill_postgresql::PostgreSQLConnector;
use trigger_backup::{FilesystemStore, TriggerBackup};

/// Engine named by the URI scheme.
pub fn engine_from_uri(uri: &str) -> Result<Engine, ConnectorError> {
    let scheme = uri.split_once("://").map(|(s, _)| s).unwrap_or_default();
    Engine::from_scheme(&scheme.to_ascii_lowercase())
        .ok_or_else(|| ConnectorError::UnsupportedEngine(scheme.to_string()))
}

/// Connect to the database behind `uri` and run the connector's `init`.
///
/// The trigger backup lives in the settings directory. `db_schema` selects the
/// PostgreSQL schema and is ignored for MariaDB/MySQL.
pub async fn connect(
    uri: &str,
    db_schema: Option<&str>,
    settings: &Settings,
) -> anyhow::Result<Box<dyn DatabaseConnector>> {
    let engine = engine_from_uri(uri)?;
    let triggers = TriggerBackup::open(FilesystemStore::in_dir(settings.dir()))
        .await
        .context("Failed to open the trigger backup")?;

    let connector: Box<dyn DatabaseConnector> = match engine {
        Engine::MariaDb => {
            // mysql_async only knows the mysql scheme
            let uri = match uri.split_once("://") {
                Some((_, rest)) => format!("mysql://{rest}"),
                None => uri.to_string(),
            };
            Box::new(
                MySQLConnector::connect(&uri, triggers)
                    .await
                    .context("Failed to connect to MariaDB/MySQL")?,
            )
        }
        Engine::Postgres => Box::new(
            PostgreSQLConnector::connect(uri, db_schema, triggers)
                .await
                .context("Failed to connect to PostgreSQL")?,
        ),
    };
    connector.init().await?;
    Ok(connector)
}
