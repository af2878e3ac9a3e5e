//! Column value generators for datafill.
//!
//! Turns a [`CustomizedTable`](fill_core::CustomizedTable) into a
//! [`TableGenerator`] producing rows column by column.
//!
//! # Architecture
//!
//! - [`GeneratorRegistry`] - Maps each [`GeneratorKind`](fill_core::GeneratorKind)
//!   to its validation and constructor
//! - [`ValueGenerator`] - A stateful generator for one column
//! - [`FunctionRegistry`] - Named callables for the `function` kind
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = GeneratorRegistry::with_defaults();
//! registry.validate(&plan, connector.engine())?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut generator = registry.build_table(table, &plan.settings, &mut rng)?;
//! generator.init(connector).await?;
//! let rows = generator.next_batch(1000)?;
//! ```

pub mod functions;
pub mod generator;
pub mod generators;
pub mod registry;

pub use functions::{CustomFunction, FunctionContext, FunctionRegistry};
pub use generator::{TableGenerator, ValueGenerator};
pub use generators::numeric::MonotonicCursor;
pub use registry::{BuildContext, GeneratorEntry, GeneratorRegistry, ValidationContext};
