//! UUID value generator.

use crate::generator::ValueGenerator;
use crate::registry::{no_validation, BuildContext, GeneratorEntry};
use async_trait::async_trait;
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;
use rand::Rng;
use ::uuid::Builder;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Uuid,
        engines: &[],
        validate: no_validation,
        build,
    }
}

fn build(
    _table: &CustomizedTable,
    _column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Ok(Box::new(UuidGenerator { rng: ctx.rng }))
}

/// Version 4 UUIDs drawn from the column RNG, so seeded runs repeat.
pub struct UuidGenerator {
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for UuidGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let bytes: [u8; 16] = self.rng.random();
        Ok(GeneratedValue::Uuid(Builder::from_random_bytes(bytes).into_uuid()))
    }
}
