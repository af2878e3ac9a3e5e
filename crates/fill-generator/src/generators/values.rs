//! The `values` kind: draws from a literal list, a weighted map or a list
//! named in `settings.values`.

use super::qualified;
use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{
    Column, CustomSettings, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row,
    ValuesSource,
};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Values,
        engines: &[],
        validate,
        build,
    }
}

/// Candidate values with their weights, pointers resolved.
fn resolve(
    column: &Column,
    settings: &CustomSettings,
) -> Result<(Vec<GeneratedValue>, Option<Vec<f64>>), String> {
    let source = column
        .values
        .as_ref()
        .ok_or_else(|| "values attribute required for type values".to_string())?;

    let (values, weights): (Vec<GeneratedValue>, Option<Vec<f64>>) = match source {
        ValuesSource::Pointer(name) => {
            let list = settings
                .values
                .get(name)
                .ok_or_else(|| format!("values list '{name}' not found in settings.values"))?;
            (list.iter().map(GeneratedValue::from_json).collect(), None)
        }
        ValuesSource::List(list) => (list.iter().map(GeneratedValue::from_json).collect(), None),
        ValuesSource::Weighted(map) => {
            if let Some((key, weight)) = map.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
                return Err(format!("invalid weight {weight} for value '{key}'"));
            }
            if map.values().sum::<f64>() <= 0.0 {
                return Err("weights must not all be zero".to_string());
            }
            let values = map.keys().map(|k| GeneratedValue::String(k.clone())).collect();
            (values, Some(map.values().copied().collect()))
        }
    };

    if values.is_empty() {
        return Err("values list must not be empty".to_string());
    }
    Ok((values, weights))
}

/// Distinct values, first occurrence kept.
fn distinct(values: Vec<GeneratedValue>) -> Vec<GeneratedValue> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.unique_key()))
        .collect()
}

fn validate(
    table: &CustomizedTable,
    column: &Column,
    ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    let (values, _) = resolve(column, ctx.settings)?;
    if column.unique && !column.is_nullable() {
        let available = distinct(values).len() as u64;
        if available < table.delta_rows {
            return Err(format!(
                "unique column has {available} distinct values for {} rows",
                table.delta_rows
            ));
        }
    }
    Ok(())
}

fn build(
    table: &CustomizedTable,
    column: &Column,
    mut ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (values, weights) = resolve(column, ctx.settings)?;
    let draw = if column.unique {
        let mut pool = distinct(values);
        pool.shuffle(&mut ctx.rng);
        Draw::WithoutReplacement { pool, next: 0 }
    } else if let Some(weights) = weights {
        let index = WeightedIndex::new(&weights).map_err(|e| e.to_string())?;
        Draw::Weighted { values, index }
    } else {
        Draw::Uniform(values)
    };
    Ok(Box::new(ValuesGenerator {
        column: qualified(&table.name, &column.name),
        nullable: column.is_nullable(),
        draw,
        rng: ctx.rng,
    }))
}

enum Draw {
    Uniform(Vec<GeneratedValue>),
    Weighted {
        values: Vec<GeneratedValue>,
        index: WeightedIndex<f64>,
    },
    /// Unique columns consume a shuffled pool
    WithoutReplacement {
        pool: Vec<GeneratedValue>,
        next: usize,
    },
}

pub struct ValuesGenerator {
    column: String,
    nullable: bool,
    draw: Draw,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for ValuesGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        match &mut self.draw {
            Draw::Uniform(values) => {
                let i = self.rng.random_range(0..values.len());
                Ok(values[i].clone())
            }
            Draw::Weighted { values, index } => Ok(values[index.sample(&mut self.rng)].clone()),
            Draw::WithoutReplacement { pool, next } => match pool.get(*next) {
                Some(value) => {
                    *next += 1;
                    Ok(value.clone())
                }
                None if self.nullable => Ok(GeneratedValue::Null),
                None => Err(FillError::ValuesExhaustion(self.column.clone())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::registry::tests::{build_one, plan_table};
    use fill_core::Engine;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn values_column(source: ValuesSource) -> Column {
        let mut column = Column::new("status", GeneratorKind::Values);
        column.values = Some(source);
        column
    }

    fn list(items: &[&str]) -> ValuesSource {
        ValuesSource::List(items.iter().map(|s| json!(s)).collect())
    }

    #[test]
    fn test_list_draws_only_listed_values() {
        let column = values_column(list(&["new", "paid", "shipped"]));
        let table = plan_table(vec![column.clone()], 50);
        let mut generator = build_one(&table, &column);

        for i in 0..50 {
            let value = generator.generate(i, &Row::new()).unwrap();
            assert!(["new", "paid", "shipped"].contains(&value.as_str().unwrap()));
        }
    }

    #[test]
    fn test_weighted_zero_weight_never_drawn() {
        let weights = BTreeMap::from([("common".to_string(), 1.0), ("never".to_string(), 0.0)]);
        let column = values_column(ValuesSource::Weighted(weights));
        let table = plan_table(vec![column.clone()], 100);
        let mut generator = build_one(&table, &column);

        for i in 0..100 {
            assert_eq!(
                generator.generate(i, &Row::new()).unwrap(),
                GeneratedValue::from("common")
            );
        }
    }

    #[test]
    fn test_pointer_resolves_against_settings() {
        let mut settings = CustomSettings::default();
        settings
            .values
            .insert("countries".to_string(), vec![json!("FR"), json!("DE")]);
        let column = values_column(ValuesSource::Pointer("countries".to_string()));
        let (values, weights) = resolve(&column, &settings).unwrap();
        assert_eq!(values.len(), 2);
        assert!(weights.is_none());

        let missing = values_column(ValuesSource::Pointer("cities".to_string()));
        assert!(resolve(&missing, &settings).unwrap_err().contains("cities"));
    }

    #[test]
    fn test_unique_draws_without_replacement() {
        let mut column = values_column(list(&["a", "b", "c"]));
        column.unique = true;
        let table = plan_table(vec![column.clone()], 3);
        let mut generator = build_one(&table, &column);

        let mut drawn: Vec<String> = (0..3)
            .map(|i| generator.generate(i, &Row::new()).unwrap().to_string())
            .collect();
        drawn.sort();
        assert_eq!(drawn, vec!["a", "b", "c"]);
        assert!(matches!(
            generator.generate(3, &Row::new()),
            Err(FillError::ValuesExhaustion(c)) if c == "t.status"
        ));
    }

    #[test]
    fn test_unique_validation_counts_distinct_values() {
        let mut column = values_column(list(&["a", "a", "b"]));
        column.unique = true;
        let table = plan_table(vec![column.clone()], 3);
        let settings = CustomSettings::default();
        let ctx = ValidationContext {
            engine: Engine::MariaDb,
            settings: &settings,
            functions: &FunctionRegistry::new(),
        };
        assert!(validate(&table, &column, &ctx).is_err());

        column.nullable = 0.5;
        assert!(validate(&table, &column, &ctx).is_ok());
    }
}
