//! PostgreSQL array literal generator.

use super::string::random_alphanumeric;
use crate::generator::ValueGenerator;
use crate::registry::{required, BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{
    ArrayElementType, Column, CustomizedTable, Engine, FillError, GeneratedValue, GeneratorKind,
    Row,
};
use rand::rngs::StdRng;
use rand::Rng;

/// Characters of a text element and digits of an int element.
const ELEMENT_WIDTH: usize = 5;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Array,
        engines: &[Engine::Postgres],
        validate,
        build,
    }
}

fn settings(column: &Column) -> Result<(u64, ArrayElementType), String> {
    let max = required(column.max, "max", GeneratorKind::Array)?;
    if max < 1.0 {
        return Err(format!("max must be at least 1 for type array, got {max}"));
    }
    let element = required(column.array_element_type, "arrayElementType", GeneratorKind::Array)?;
    Ok((max as u64, element))
}

fn validate(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    settings(column).map(|_| ())
}

fn build(
    _table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (max, element) = settings(column)?;
    Ok(Box::new(ArrayGenerator {
        max,
        element,
        rng: ctx.rng,
    }))
}

/// `{a,b,c}` literals holding between 1 and `max` elements.
pub struct ArrayGenerator {
    max: u64,
    element: ArrayElementType,
    rng: StdRng,
}

impl ArrayGenerator {
    fn element(&mut self) -> String {
        match self.element {
            ArrayElementType::Text => random_alphanumeric(&mut self.rng, ELEMENT_WIDTH),
            ArrayElementType::Int => self
                .rng
                .random::<u32>()
                .to_string()
                .chars()
                .take(ELEMENT_WIDTH)
                .collect(),
        }
    }
}

#[async_trait]
impl ValueGenerator for ArrayGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let count = self.rng.random_range(1..=self.max);
        let elements: Vec<String> = (0..count).map(|_| self.element()).collect();
        Ok(GeneratedValue::String(format!("{{{}}}", elements.join(","))))
    }
}
