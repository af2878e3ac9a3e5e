//! PostgreSQL connector for datafill.

mod connector;
mod error;
mod triggers;
mod types;
mod value;

pub use connector::{quote, PostgreSQLConnector, DEFAULT_SCHEMA};
pub use error::PostgreSQLConnectorError;
pub use types::{column_from_catalog, CatalogColumn};
pub use value::{quote_literal, to_literal};
