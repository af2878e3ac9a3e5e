//! PostgreSQL catalog to generator mapping.

use fill_core::{ArrayElementType, Column, GeneratorKind};

const INT_RANGE: (f64, f64) = (-2147483648.0, 2147483647.0);

/// Elements drawn at most for an array column.
const DEFAULT_ARRAY_LENGTH: f64 = 5.0;

/// One row of `information_schema.columns`, plus its single-column unique
/// constraint flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogColumn {
    pub name: String,
    /// `data_type`, e.g. `character varying` or `ARRAY`
    pub data_type: String,
    /// `udt_name`, e.g. `varchar` or `_int4`
    pub udt_name: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub is_identity: bool,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub unique: bool,
}

fn array_element(udt_name: &str) -> Option<ArrayElementType> {
    match udt_name.trim_start_matches('_') {
        "int2" | "int4" | "int8" | "numeric" => Some(ArrayElementType::Int),
        "text" | "varchar" | "bpchar" => Some(ArrayElementType::Text),
        _ => None,
    }
}

/// Map a catalog row to a column with its default generator.
pub fn column_from_catalog(catalog: &CatalogColumn) -> Column {
    let mut column = Column::new(&catalog.name, GeneratorKind::None);
    column.unique = catalog.unique;
    column.nullable = if catalog.is_nullable { 0.1 } else { 0.0 };
    column.auto_increment = catalog.is_identity
        || catalog
            .column_default
            .as_deref()
            .is_some_and(|d| d.starts_with("nextval("));
    column.max = Some(
        catalog
            .character_maximum_length
            .or(catalog.numeric_precision)
            .unwrap_or(255) as f64,
    );

    match catalog.data_type.as_str() {
        "boolean" => column.generator = GeneratorKind::Boolean,
        "smallint" => {
            column.generator = GeneratorKind::Integer;
            column = column.with_range(-32768.0, 32767.0);
        }
        "integer" | "bigint" => {
            column.generator = GeneratorKind::Integer;
            column = column.with_range(INT_RANGE.0, INT_RANGE.1);
        }
        "numeric" | "decimal" | "real" | "double precision" => {
            column.generator = GeneratorKind::Real;
            column = column.with_range(INT_RANGE.0, INT_RANGE.1);
        }
        "date" | "timestamp without time zone" | "timestamp with time zone" => {
            column.generator = GeneratorKind::Date;
            column.min_date = Some("1970-01-01".to_string());
        }
        "time without time zone" | "time with time zone" => column.generator = GeneratorKind::Time,
        "interval" => column.generator = GeneratorKind::Interval,
        "uuid" => column.generator = GeneratorKind::Uuid,
        "character varying" | "character" | "text" | "bytea" | "citext" => {
            column.generator = GeneratorKind::String
        }
        "bit" | "bit varying" => {
            column.generator = GeneratorKind::Bit;
            column.max = Some(catalog.character_maximum_length.unwrap_or(1) as f64);
        }
        "ARRAY" => {
            if let Some(element) = array_element(&catalog.udt_name) {
                column.generator = GeneratorKind::Array;
                column.array_element_type = Some(element);
                column.max = Some(DEFAULT_ARRAY_LENGTH);
            }
        }
        _ => {}
    }
    column
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(data_type: &str, udt_name: &str) -> CatalogColumn {
        CatalogColumn {
            name: "c".to_string(),
            data_type: data_type.to_string(),
            udt_name: udt_name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_serial_is_auto_increment() {
        let mut row = catalog("integer", "int4");
        row.column_default = Some("nextval('orders_id_seq'::regclass)".to_string());
        row.unique = true;
        let column = column_from_catalog(&row);
        assert!(column.auto_increment);
        assert!(column.unique);
        assert_eq!(column.generator, GeneratorKind::Integer);

        let mut row = catalog("bigint", "int8");
        row.is_identity = true;
        assert!(column_from_catalog(&row).auto_increment);
    }

    #[test]
    fn test_arrays() {
        let column = column_from_catalog(&catalog("ARRAY", "_int4"));
        assert_eq!(column.generator, GeneratorKind::Array);
        assert_eq!(column.array_element_type, Some(ArrayElementType::Int));
        assert_eq!(column.max, Some(5.0));

        let column = column_from_catalog(&catalog("ARRAY", "_varchar"));
        assert_eq!(column.array_element_type, Some(ArrayElementType::Text));

        let column = column_from_catalog(&catalog("ARRAY", "_jsonb"));
        assert_eq!(column.generator, GeneratorKind::None);
    }

    #[test]
    fn test_scalar_kinds() {
        let mut row = catalog("character varying", "varchar");
        row.character_maximum_length = Some(32);
        row.is_nullable = true;
        let column = column_from_catalog(&row);
        assert_eq!(column.generator, GeneratorKind::String);
        assert_eq!(column.max, Some(32.0));
        assert_eq!(column.nullable, 0.1);

        assert_eq!(
            column_from_catalog(&catalog("interval", "interval")).generator,
            GeneratorKind::Interval
        );
        assert_eq!(
            column_from_catalog(&catalog("uuid", "uuid")).generator,
            GeneratorKind::Uuid
        );
        let column = column_from_catalog(&catalog("timestamp with time zone", "timestamptz"));
        assert_eq!(column.generator, GeneratorKind::Date);
        assert_eq!(column.min_date.as_deref(), Some("1970-01-01"));
    }
}
