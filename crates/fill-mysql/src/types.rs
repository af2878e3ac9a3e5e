//! MySQL catalog to generator mapping.
//!
//! Each `information_schema.COLUMNS` row is normalized into a [`Column`] so
//! that the generation core never branches on the engine.

use fill_core::{Column, GeneratorKind};

/// Range used for `int`, `decimal` and friends.
const INT_RANGE: (f64, f64) = (-2147483648.0, 2147483647.0);
const UNSIGNED_INT_RANGE: (f64, f64) = (0.0, 2147483647.0);

/// One row of `information_schema.COLUMNS`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogColumn {
    pub name: String,
    /// `DATA_TYPE`, e.g. `varchar`
    pub data_type: String,
    /// `COLUMN_TYPE`, e.g. `int(10) unsigned` or `enum('a','b')`
    pub column_type: String,
    /// `COLUMN_KEY`: `PRI`, `UNI`, `MUL` or empty
    pub column_key: String,
    pub is_nullable: bool,
    /// `EXTRA`, e.g. `auto_increment`
    pub extra: String,
    pub character_maximum_length: Option<u64>,
    pub numeric_precision: Option<u64>,
}

/// Number of members of an `enum(...)` or `set(...)` column type.
fn member_count(column_type: &str) -> Option<u64> {
    let start = column_type.find('(')?;
    let end = column_type.rfind(')')?;
    let members = &column_type[start + 1..end];
    if members.is_empty() {
        return None;
    }
    Some(members.split("','").count() as u64)
}

/// Map a catalog row to a column with its default generator.
pub fn column_from_catalog(catalog: &CatalogColumn) -> Column {
    let mut column = Column::new(&catalog.name, GeneratorKind::None);
    let key = catalog.column_key.to_ascii_uppercase();
    column.unique = key.contains("PRI") || key.contains("UNI");
    column.nullable = if catalog.is_nullable { 0.1 } else { 0.0 };
    column.unsigned = catalog.column_type.contains("unsigned");
    column.auto_increment = catalog.extra.contains("auto_increment");

    let precision = match catalog.data_type.as_str() {
        "enum" | "set" => member_count(&catalog.column_type),
        _ => catalog.numeric_precision,
    };
    column.max = Some(
        catalog
            .character_maximum_length
            .or(precision)
            .unwrap_or(255) as f64,
    );

    let set_range = |column: &mut Column, signed: (f64, f64), unsigned: (f64, f64)| {
        let (min, max) = if column.unsigned { unsigned } else { signed };
        column.min = Some(min);
        column.max = Some(max);
    };

    match catalog.data_type.as_str() {
        "bool" | "boolean" => column.generator = GeneratorKind::Boolean,
        "tinyint" => {
            column.generator = GeneratorKind::Integer;
            set_range(&mut column, (-128.0, 127.0), (0.0, 255.0));
        }
        "smallint" => {
            column.generator = GeneratorKind::Integer;
            set_range(&mut column, (-32768.0, 32767.0), (0.0, 65535.0));
        }
        "mediumint" => {
            column.generator = GeneratorKind::Integer;
            set_range(&mut column, (-8388608.0, 8388607.0), (0.0, 16777215.0));
        }
        "int" | "integer" | "bigint" => {
            column.generator = GeneratorKind::Integer;
            set_range(&mut column, INT_RANGE, UNSIGNED_INT_RANGE);
        }
        "decimal" | "dec" | "float" | "double" => {
            column.generator = GeneratorKind::Real;
            set_range(&mut column, INT_RANGE, UNSIGNED_INT_RANGE);
        }
        "date" | "datetime" | "timestamp" => {
            column.generator = GeneratorKind::Date;
            column.min_date = Some("1970-01-01".to_string());
            column.max_date = None;
        }
        "time" => column.generator = GeneratorKind::Time,
        "year" => {
            column.generator = GeneratorKind::Integer;
            column.min = Some(1901.0);
            column.max = Some(2155.0);
        }
        "varchar" | "char" | "binary" | "varbinary" | "tinyblob" | "text" | "tinytext"
        | "mediumtext" | "longtext" | "blob" | "mediumblob" | "longblob" => {
            column.generator = GeneratorKind::String
        }
        "bit" | "set" => {
            column.generator = GeneratorKind::Bit;
            column.max = precision.map(|p| p as f64);
        }
        "enum" => {
            column.generator = GeneratorKind::Integer;
            column.min = Some(1.0);
            column.max = precision.map(|p| p as f64);
        }
        _ => {}
    }
    column
}
