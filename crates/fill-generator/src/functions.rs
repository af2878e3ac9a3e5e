//! Side registry of named functions for the `function` generator.

use chrono::Utc;
use fill_core::{Column, GeneratedValue, Row};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;

/// Arguments handed to a custom function for one row.
pub struct FunctionContext<'a> {
    pub row_index: u64,
    /// Columns generated earlier in the row
    pub row: &'a Row,
    pub column: &'a Column,
    pub rng: &'a mut StdRng,
}

pub type CustomFunction = Arc<dyn Fn(&mut FunctionContext<'_>) -> GeneratedValue + Send + Sync>;

/// Named functions a column can reference with `customFunction`.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, CustomFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in functions:
    ///
    /// - `index` - the row index within this run
    /// - `now` - the current timestamp
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("index", |ctx| GeneratedValue::Int64(ctx.row_index as i64));
        registry.register("now", |_| GeneratedValue::DateTime(Utc::now()));
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&mut FunctionContext<'_>) -> GeneratedValue + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<CustomFunction> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
