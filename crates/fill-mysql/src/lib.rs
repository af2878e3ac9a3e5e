//! MariaDB/MySQL connector for datafill.
//!
//! Introspects `information_schema`, inserts with `INSERT IGNORE` and keeps
//! trigger definitions in a [`trigger_backup::TriggerBackup`] while tables are
//! filled.

mod connector;
mod error;
mod triggers;
mod types;
mod value;

pub use connector::{quote, MySQLConnector, SESSION_INIT};
pub use error::MySQLConnectorError;
pub use types::{column_from_catalog, CatalogColumn};
pub use value::{from_mysql, to_mysql};
