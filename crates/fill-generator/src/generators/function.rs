//! The `function` kind: values from a named custom function.

use crate::functions::{CustomFunction, FunctionContext};
use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Function,
        engines: &[],
        validate,
        build,
    }
}

fn function_name(column: &Column) -> Result<&str, String> {
    column
        .custom_function
        .as_deref()
        .ok_or_else(|| "customFunction value required for type function".to_string())
}

fn validate(
    _table: &CustomizedTable,
    column: &Column,
    ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    let name = function_name(column)?;
    if !ctx.functions.contains(name) {
        return Err(format!(
            "unknown custom function '{name}' (registered: {})",
            ctx.functions.names().join(", ")
        ));
    }
    Ok(())
}

fn build(
    _table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let name = function_name(column)?;
    let function = ctx
        .functions
        .get(name)
        .ok_or_else(|| format!("unknown custom function '{name}'"))?;
    Ok(Box::new(FunctionGenerator {
        function,
        column: column.clone(),
        rng: ctx.rng,
    }))
}

pub struct FunctionGenerator {
    function: CustomFunction,
    column: Column,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for FunctionGenerator {
    fn generate(&mut self, row_index: u64, row: &Row) -> Result<GeneratedValue, FillError> {
        let mut ctx = FunctionContext {
            row_index,
            row,
            column: &self.column,
            rng: &mut self.rng,
        };
        Ok((self.function)(&mut ctx))
    }
}
