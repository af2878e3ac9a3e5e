//! PostgreSQL interval literal generator.

use crate::generator::ValueGenerator;
use crate::registry::{no_validation, BuildContext, GeneratorEntry};
use async_trait::async_trait;
use fill_core::{Column, CustomizedTable, Engine, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;
use rand::Rng;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Interval,
        engines: &[Engine::Postgres],
        validate: no_validation,
        build,
    }
}

fn build(
    _table: &CustomizedTable,
    _column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Ok(Box::new(IntervalGenerator { rng: ctx.rng }))
}

/// Literals such as `3 year 11 month 200 day 4:30:2`.
pub struct IntervalGenerator {
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for IntervalGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let rng = &mut self.rng;
        Ok(GeneratedValue::String(format!(
            "{} year {} month {} day {}:{}:{}",
            rng.random_range(0..=99),
            rng.random_range(0..=12),
            rng.random_range(0..=365),
            rng.random_range(0..=23),
            rng.random_range(0..=59),
            rng.random_range(0..=59),
        )))
    }
}
