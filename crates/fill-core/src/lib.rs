//! Core types for the datafill engine.
//!
//! This crate provides the foundational types shared by the generators, the
//! connectors and the filler:
//!
//! - [`Schema`] - Engine-agnostic tables, columns and foreign keys
//! - [`CustomSchema`] - User customization read from the JSONC file
//! - [`CustomizedSchema`] - The merged generation plan
//! - [`GeneratedValue`] / [`Row`] - Generated data
//! - [`DatabaseConnector`] - The interface every engine implements
//!
//! # Architecture
//!
//! ```text
//! fill-core (this crate)
//!    │
//!    ├─── fill-generator     (value generators over CustomizedTable)
//!    ├─── fill-mysql         (DatabaseConnector for MariaDB/MySQL)
//!    └─── fill-postgresql    (DatabaseConnector for PostgreSQL)
//! ```

pub mod connector;
pub mod custom;
pub mod customized;
pub mod error;
pub mod schema;
pub mod values;

// Re-exports for convenience
pub use connector::{DatabaseConnector, Engine, ForeignKeyInfo, ForeignKeyQuery};
pub use custom::{ColumnOverride, CustomColumn, CustomSchema, CustomSettings, CustomTable, KindOptions};
pub use customized::{delta_rows, CustomizedSchema, CustomizedTable};
pub use error::{ConnectorError, FillError, GeneratorConfigError};
pub use schema::{
    ArrayElementType, Column, ForeignKey, GeneratorKind, Monotonic, Schema, SchemaError, Table,
    ValuesSource,
};
pub use values::{GeneratedValue, Row};
