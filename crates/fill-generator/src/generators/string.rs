//! Random alphanumeric string generator.

use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{
    Column, CustomSettings, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row,
};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::Rng;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::String,
        engines: &[],
        validate,
        build,
    }
}

/// Length range of the generated strings.
///
/// The upper bound is the smaller of the column `max` and the global
/// `maxLengthValue`, or whichever of them is set.
fn length_range(column: &Column, settings: &CustomSettings) -> Result<(usize, usize), String> {
    let column_max = column.max.map(|m| m.max(0.0) as u64);
    let bound = match (column_max, settings.max_length_value) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return Err("max value required for type string".to_string()),
    };
    if bound == 0 {
        return Err("max length must be at least 1".to_string());
    }
    let min = column.min.map(|m| m.max(1.0) as u64).unwrap_or(1).min(bound);
    Ok((min as usize, bound as usize))
}

fn validate(
    _table: &CustomizedTable,
    column: &Column,
    ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    length_range(column, ctx.settings).map(|_| ())
}

fn build(
    _table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (min, max) = length_range(column, ctx.settings)?;
    Ok(Box::new(StringGenerator {
        min,
        max,
        rng: ctx.rng,
    }))
}

pub struct StringGenerator {
    min: usize,
    max: usize,
    rng: StdRng,
}

/// Random alphanumeric string of exactly `len` characters.
pub(crate) fn random_alphanumeric(rng: &mut StdRng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[async_trait]
impl ValueGenerator for StringGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let len = self.rng.random_range(self.min..=self.max);
        Ok(GeneratedValue::String(random_alphanumeric(&mut self.rng, len)))
    }
}
