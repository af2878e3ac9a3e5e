//! The `none` kind: introspection could not pick a generator.

use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use fill_core::{Column, CustomizedTable, GeneratorKind};

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::None,
        engines: &[],
        validate,
        build,
    }
}

fn validate(
    table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    Err(format!(
        "No generator defined for column: {}.{}",
        table.name, column.name
    ))
}

fn build(
    table: &CustomizedTable,
    column: &Column,
    _ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Err(format!(
        "No generator defined for column: {}.{}",
        table.name, column.name
    ))
}
