//! Schema definitions produced by database introspection.
//!
//! The persisted schema file (`settings/<name>.json`) is the serialized form of
//! [`Schema`]. Field names are camelCase so that the file can be edited by hand
//! and round-trips losslessly between an analyse run and later generate runs.

use crate::connector::ForeignKeyInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema file operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading or writing the schema file
    #[error("Failed to access schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing or serializing JSON
    #[error("Failed to parse schema JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

// ============================================================================
// Generator kinds and column attributes
// ============================================================================

/// The kind of value generator attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorKind {
    #[default]
    None,
    Bit,
    Integer,
    Boolean,
    Real,
    Date,
    Time,
    String,
    Values,
    ForeignKey,
    Uuid,
    Array,
    Interval,
    Function,
    Faker,
    Template,
}

impl GeneratorKind {
    /// Every kind, in declaration order.
    pub const ALL: [GeneratorKind; 16] = [
        GeneratorKind::None,
        GeneratorKind::Bit,
        GeneratorKind::Integer,
        GeneratorKind::Boolean,
        GeneratorKind::Real,
        GeneratorKind::Date,
        GeneratorKind::Time,
        GeneratorKind::String,
        GeneratorKind::Values,
        GeneratorKind::ForeignKey,
        GeneratorKind::Uuid,
        GeneratorKind::Array,
        GeneratorKind::Interval,
        GeneratorKind::Function,
        GeneratorKind::Faker,
        GeneratorKind::Template,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::None => "none",
            GeneratorKind::Bit => "bit",
            GeneratorKind::Integer => "integer",
            GeneratorKind::Boolean => "boolean",
            GeneratorKind::Real => "real",
            GeneratorKind::Date => "date",
            GeneratorKind::Time => "time",
            GeneratorKind::String => "string",
            GeneratorKind::Values => "values",
            GeneratorKind::ForeignKey => "foreignKey",
            GeneratorKind::Uuid => "uuid",
            GeneratorKind::Array => "array",
            GeneratorKind::Interval => "interval",
            GeneratorKind::Function => "function",
            GeneratorKind::Faker => "faker",
            GeneratorKind::Template => "template",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering constraint across successive rows of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Monotonic {
    Asc,
    Desc,
    #[default]
    None,
}

/// Element type of a generated array column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayElementType {
    Int,
    Text,
}

/// Reference from a column to a column of another (or the same) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table
    pub table: String,
    /// Referenced column
    pub column: String,
    /// Raw SQL condition restricting the candidate values
    #[serde(
        rename = "where",
        alias = "whereCondition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub where_condition: Option<String>,
    /// Set when the constraint spans several columns
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub composite: bool,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            where_condition: None,
            composite: false,
        }
    }
}

/// Source of values for the `values` generator.
///
/// A string is a pointer into the named lists of the customization settings,
/// an array is a literal list and an object maps each value to its relative
/// weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValuesSource {
    Pointer(String),
    List(Vec<serde_json::Value>),
    Weighted(BTreeMap<String, f64>),
}

// ============================================================================
// Column / Table / Schema
// ============================================================================

/// Engine-agnostic column description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,

    #[serde(default)]
    pub generator: GeneratorKind,

    /// Probability of a null value, 0 meaning never null.
    #[serde(default)]
    pub nullable: f64,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub auto_increment: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unsigned: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValuesSource>,

    #[serde(default)]
    pub monotonic: Monotonic,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_function: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_element_type: Option<ArrayElementType>,
}

impl Column {
    /// Create a column with the given generator and default attributes.
    pub fn new(name: impl Into<String>, generator: GeneratorKind) -> Self {
        Self {
            name: name.into(),
            generator,
            nullable: 0.0,
            unique: false,
            auto_increment: false,
            unsigned: false,
            min: None,
            max: None,
            min_date: None,
            max_date: None,
            foreign_key: None,
            values: None,
            monotonic: Monotonic::None,
            custom_function: None,
            template: None,
            locale: None,
            array_element_type: None,
        }
    }

    /// Set the numeric bounds.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Turn the column into a foreign key column.
    pub fn with_foreign_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.generator = GeneratorKind::ForeignKey;
        self.foreign_key = Some(ForeignKey::new(table, column));
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable > 0.0
    }
}

/// A table and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<Column>,

    /// Tables this table has outgoing foreign keys to.
    #[serde(default)]
    pub referenced_tables: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut table = Self {
            name: name.into(),
            columns,
            referenced_tables: Vec::new(),
        };
        table.refresh_referenced_tables();
        table
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Attach introspected foreign keys to their columns.
    ///
    /// A matching column is forced to the `foreignKey` generator and becomes
    /// unique when the referencing column carries a single-column unique index.
    pub fn apply_foreign_keys(&mut self, foreign_keys: &[ForeignKeyInfo]) {
        for column in &mut self.columns {
            let matched = foreign_keys
                .iter()
                .find(|fk| fk.column.eq_ignore_ascii_case(&column.name));
            if let Some(fk) = matched {
                column.generator = GeneratorKind::ForeignKey;
                column.foreign_key = Some(ForeignKey {
                    table: fk.foreign_table.clone(),
                    column: fk.foreign_column.clone(),
                    where_condition: None,
                    composite: fk.composite,
                });
                column.unique = column.unique || fk.unique_index;
            }
        }
        self.refresh_referenced_tables();
    }

    /// Recompute `referenced_tables` from the columns' foreign keys.
    pub fn refresh_referenced_tables(&mut self) {
        let mut referenced: Vec<String> = Vec::new();
        for fk in self.columns.iter().filter_map(|c| c.foreign_key.as_ref()) {
            if !referenced.contains(&fk.table) {
                referenced.push(fk.table.clone());
            }
        }
        self.referenced_tables = referenced;
    }
}

/// Introspected database schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Load a schema from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a schema from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the schema as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the schema to a JSON file.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SchemaError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get all table names in schema order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        let mut customers = Column::new("id", GeneratorKind::Integer).with_range(1.0, 1000.0);
        customers.unique = true;
        customers.auto_increment = true;

        let mut status = Column::new("status", GeneratorKind::Values);
        status.values = Some(ValuesSource::List(vec![
            serde_json::json!("new"),
            serde_json::json!("paid"),
        ]));

        let mut created = Column::new("created_at", GeneratorKind::Date);
        created.min_date = Some("2020-01-01".to_string());
        created.monotonic = Monotonic::Asc;
        created.nullable = 0.1;

        let mut tags = Column::new("tags", GeneratorKind::Array);
        tags.max = Some(4.0);
        tags.array_element_type = Some(ArrayElementType::Text);

        let mut weighted = Column::new("tier", GeneratorKind::Values);
        weighted.values = Some(ValuesSource::Weighted(BTreeMap::from([
            ("gold".to_string(), 1.0),
            ("silver".to_string(), 3.5),
        ])));

        let mut customer_id = Column::new("customer_id", GeneratorKind::Integer)
            .with_foreign_key("customers", "id");
        if let Some(fk) = customer_id.foreign_key.as_mut() {
            fk.where_condition = Some("customers.id > 2".to_string());
        }

        Schema::new(vec![
            Table::new("customers", vec![customers, weighted]),
            Table::new(
                "orders",
                vec![
                    Column::new("id", GeneratorKind::Uuid),
                    customer_id,
                    status,
                    created,
                    tags,
                ],
            ),
        ])
    }

    #[test]
    fn test_schema_round_trip() {
        let schema = sample_schema();
        let json = schema.to_json().unwrap();
        let parsed = Schema::from_json(&json).unwrap();
        assert_eq!(schema, parsed);
        assert_eq!(parsed.table_names(), vec!["customers", "orders"]);
    }

    #[test]
    fn test_schema_json_field_names() {
        let json = sample_schema().to_json().unwrap();
        assert!(json.contains("\"referencedTables\""));
        assert!(json.contains("\"foreignKey\""));
        assert!(json.contains("\"autoIncrement\""));
        assert!(json.contains("\"where\": \"customers.id > 2\""));
        assert!(json.contains("\"monotonic\": \"ASC\""));
    }

    #[test]
    fn test_column_defaults_from_minimal_json() {
        let column: Column = serde_json::from_str(r#"{"name": "title"}"#).unwrap();
        assert_eq!(column.generator, GeneratorKind::None);
        assert_eq!(column.nullable, 0.0);
        assert_eq!(column.monotonic, Monotonic::None);
        assert!(!column.unique);
    }

    #[test]
    fn test_where_condition_alias() {
        let fk: ForeignKey =
            serde_json::from_str(r#"{"table": "a", "column": "id", "whereCondition": "id > 1"}"#)
                .unwrap();
        assert_eq!(fk.where_condition.as_deref(), Some("id > 1"));
    }

    #[test]
    fn test_values_source_variants() {
        let pointer: ValuesSource = serde_json::from_str(r#""colors""#).unwrap();
        assert_eq!(pointer, ValuesSource::Pointer("colors".to_string()));

        let list: ValuesSource = serde_json::from_str(r#"["a", 1]"#).unwrap();
        assert!(matches!(list, ValuesSource::List(ref v) if v.len() == 2));

        let weighted: ValuesSource = serde_json::from_str(r#"{"a": 2, "b": 1}"#).unwrap();
        assert!(matches!(weighted, ValuesSource::Weighted(ref m) if m["a"] == 2.0));
    }

    #[test]
    fn test_apply_foreign_keys_forces_generator() {
        let mut table = Table::new(
            "orders",
            vec![
                Column::new("id", GeneratorKind::Integer),
                Column::new("Customer_Id", GeneratorKind::Integer),
                Column::new("parent_id", GeneratorKind::Integer),
            ],
        );
        table.apply_foreign_keys(&[
            ForeignKeyInfo {
                column: "customer_id".to_string(),
                foreign_table: "customers".to_string(),
                foreign_column: "id".to_string(),
                unique_index: true,
                composite: false,
            },
            ForeignKeyInfo {
                column: "parent_id".to_string(),
                foreign_table: "orders".to_string(),
                foreign_column: "id".to_string(),
                unique_index: false,
                composite: false,
            },
        ]);

        let customer = table.get_column("Customer_Id").unwrap();
        assert_eq!(customer.generator, GeneratorKind::ForeignKey);
        assert!(customer.unique);
        assert_eq!(customer.foreign_key.as_ref().unwrap().table, "customers");
        assert_eq!(table.referenced_tables, vec!["customers", "orders"]);
    }
}
