//! The `foreignKey` kind: values drawn from the referenced column.
//!
//! At init the generator fetches up to `deltaRows` distinct candidates from
//! the referenced column, optionally filtered by `where`. A unique column
//! also skips candidates it already references. The pool is shuffled once,
//! then handed out in order:
//!
//! - row `i < pool.len()` gets `pool[i]`
//! - past the pool, a non-unique column cycles through it again
//! - past the pool, a unique column gets Null when nullable and fails with
//!   [`FillError::ForeignKeyExhaustion`] otherwise

use super::qualified;
use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{
    Column, CustomizedTable, DatabaseConnector, FillError, ForeignKeyQuery, GeneratedValue,
    GeneratorKind, Row,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::ForeignKey,
        engines: &[],
        validate,
        build,
    }
}

fn query(table: &CustomizedTable, column: &Column) -> Result<ForeignKeyQuery, String> {
    let foreign_key = column
        .foreign_key
        .as_ref()
        .ok_or_else(|| "foreignKey value required for type foreignKey".to_string())?;
    if foreign_key.composite {
        return Err(format!(
            "composite foreign key to {} is not supported",
            foreign_key.table
        ));
    }
    Ok(ForeignKeyQuery {
        table: table.name.clone(),
        column: column.name.clone(),
        foreign_table: foreign_key.table.clone(),
        foreign_column: foreign_key.column.clone(),
        limit: table.delta_rows,
        unique: column.unique,
        condition: foreign_key.where_condition.clone(),
    })
}

fn validate(
    table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    query(table, column).map(|_| ())
}

fn build(
    table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Ok(Box::new(ForeignKeyGenerator {
        query: query(table, column)?,
        nullable: column.is_nullable(),
        pool: Vec::new(),
        rng: ctx.rng,
    }))
}

pub struct ForeignKeyGenerator {
    query: ForeignKeyQuery,
    nullable: bool,
    pool: Vec<GeneratedValue>,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for ForeignKeyGenerator {
    async fn init(&mut self, connector: &dyn DatabaseConnector) -> Result<(), FillError> {
        let mut pool = connector.get_values_for_foreign_keys(&self.query).await?;
        pool.shuffle(&mut self.rng);
        debug!(
            "Fetched {} candidate values for {}.{} from {}.{}",
            pool.len(),
            self.query.table,
            self.query.column,
            self.query.foreign_table,
            self.query.foreign_column
        );
        self.pool = pool;
        Ok(())
    }

    fn generate(&mut self, row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let index = row_index as usize;
        if let Some(value) = self.pool.get(index) {
            return Ok(value.clone());
        }
        if !self.query.unique && !self.pool.is_empty() {
            return Ok(self.pool[index % self.pool.len()].clone());
        }
        if self.nullable {
            Ok(GeneratedValue::Null)
        } else {
            Err(FillError::ForeignKeyExhaustion(qualified(
                &self.query.table,
                &self.query.column,
            )))
        }
    }
}
