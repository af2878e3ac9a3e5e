//! Test support: an in-memory connector and shared fixtures.

pub mod fixtures;
pub mod memory;

pub use fixtures::{profiles_schema, shop_schema, write_settings};
pub use memory::{MemoryConnector, MEMORY_SCHEMA};
