//! Stateful value generators and the per-table row generator.

use async_trait::async_trait;
use fill_core::{DatabaseConnector, FillError, GeneratedValue, Row};
use rand::rngs::StdRng;
use rand::Rng;

/// A stateful generator producing one column's values.
///
/// `init` runs once before the first row. `generate` is then called with
/// strictly increasing row indexes and may read the columns generated earlier
/// in the same row.
#[async_trait]
pub trait ValueGenerator: Send {
    async fn init(&mut self, _connector: &dyn DatabaseConnector) -> Result<(), FillError> {
        Ok(())
    }

    fn generate(&mut self, row_index: u64, row: &Row) -> Result<GeneratedValue, FillError>;
}

pub(crate) struct ColumnGenerator {
    pub(crate) name: String,
    pub(crate) nullable: f64,
    pub(crate) generator: Box<dyn ValueGenerator>,
}

/// Generates the rows of one table.
///
/// Columns are generated in declaration order. Auto increment columns are
/// left out so the database assigns them.
pub struct TableGenerator {
    table: String,
    columns: Vec<ColumnGenerator>,
    /// Drives the null draws
    rng: StdRng,
    /// Index of the next row
    index: u64,
}

impl TableGenerator {
    pub(crate) fn new(table: impl Into<String>, columns: Vec<ColumnGenerator>, rng: StdRng) -> Self {
        Self {
            table: table.into(),
            columns,
            rng,
            index: 0,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Names of the generated columns, in generation order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the current row index.
    pub fn current_index(&self) -> u64 {
        self.index
    }

    /// Run every column generator's async setup.
    pub async fn init(&mut self, connector: &dyn DatabaseConnector) -> Result<(), FillError> {
        for column in &mut self.columns {
            column.generator.init(connector).await?;
        }
        Ok(())
    }

    /// Generate the next row.
    pub fn next_row(&mut self) -> Result<Row, FillError> {
        let index = self.index;
        let mut row = Row::with_capacity(self.columns.len());
        for column in &mut self.columns {
            let value = if column.nullable > 0.0 && self.rng.random_bool(column.nullable.min(1.0)) {
                GeneratedValue::Null
            } else {
                column.generator.generate(index, &row)?
            };
            row.push(column.name.clone(), value);
        }
        self.index += 1;
        Ok(row)
    }

    /// Generate the next `count` rows.
    pub fn next_batch(&mut self, count: u64) -> Result<Vec<Row>, FillError> {
        (0..count).map(|_| self.next_row()).collect()
    }
}
