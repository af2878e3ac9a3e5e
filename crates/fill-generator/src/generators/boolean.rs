//! Boolean value generator.
//!
//! `max`, when set, is the probability of `true`. Otherwise both values are
//! equally likely.

use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;
use rand::Rng;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Boolean,
        engines: &[],
        validate,
        build,
    }
}

fn true_probability(column: &Column) -> Result<f64, String> {
    match column.max {
        None => Ok(0.5),
        Some(p) if (0.0..=1.0).contains(&p) => Ok(p),
        Some(p) => Err(format!("boolean probability must be within [0, 1], got {p}")),
    }
}

fn validate(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    true_probability(column).map(|_| ())
}

fn build(
    _table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Ok(Box::new(BooleanGenerator {
        probability: true_probability(column)?,
        rng: ctx.rng,
    }))
}

pub struct BooleanGenerator {
    probability: f64,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for BooleanGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        Ok(GeneratedValue::Bool(self.rng.random_bool(self.probability)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{build_one, plan_table};

    #[test]
    fn test_generate_boolean_yields_both_values() {
        let column = Column::new("active", GeneratorKind::Boolean);
        let table = plan_table(vec![column.clone()], 100);
        let mut generator = build_one(&table, &column);

        let values: Vec<_> = (0..100)
            .map(|i| generator.generate(i, &Row::new()).unwrap())
            .collect();
        assert!(values.contains(&GeneratedValue::Bool(true)));
        assert!(values.contains(&GeneratedValue::Bool(false)));
    }

    #[test]
    fn test_probability_from_max() {
        let mut column = Column::new("active", GeneratorKind::Boolean);
        column.max = Some(1.0);
        let table = plan_table(vec![column.clone()], 20);
        let mut always = build_one(&table, &column);
        for i in 0..20 {
            assert_eq!(always.generate(i, &Row::new()).unwrap(), GeneratedValue::Bool(true));
        }

        column.max = Some(0.0);
        let mut never = build_one(&table, &column);
        for i in 0..20 {
            assert_eq!(never.generate(i, &Row::new()).unwrap(), GeneratedValue::Bool(false));
        }

        column.max = Some(1.5);
        assert!(true_probability(&column).is_err());
    }
}
