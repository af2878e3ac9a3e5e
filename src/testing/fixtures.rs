//! Schemas and settings directories shared by the tests.

use crate::settings::Settings;
use fill_core::{Column, GeneratorKind, Schema, Table, ValuesSource};
use std::fs;
use std::path::Path;

fn auto_id() -> Column {
    let mut id = Column::new("id", GeneratorKind::Integer);
    id.auto_increment = true;
    id.unique = true;
    id
}

/// `customers` and `orders`, orders referencing customers.
///
/// Order status is drawn from `new` and `paid`.
pub fn shop_schema() -> Schema {
    let mut email = Column::new("email", GeneratorKind::String);
    email.unique = true;
    email.min = Some(8.0);
    let mut status = Column::new("status", GeneratorKind::Values);
    status.values = Some(ValuesSource::List(vec!["new".into(), "paid".into()]));

    Schema::new(vec![
        Table::new(
            "orders",
            vec![
                auto_id(),
                Column::new("customer_id", GeneratorKind::Integer)
                    .with_foreign_key("customers", "id"),
                status,
                Column::new("total", GeneratorKind::Real).with_range(1.0, 500.0),
            ],
        ),
        Table::new(
            "customers",
            vec![auto_id(), Column::new("name", GeneratorKind::String), email],
        ),
    ])
}

/// `customers` plus `profiles` holding a unique reference to a customer.
pub fn profiles_schema(nullable: f64) -> Schema {
    let mut customer_id =
        Column::new("customer_id", GeneratorKind::Integer).with_foreign_key("customers", "id");
    customer_id.unique = true;
    customer_id.nullable = nullable;

    Schema::new(vec![
        Table::new("customers", vec![auto_id(), Column::new("name", GeneratorKind::String)]),
        Table::new(
            "profiles",
            vec![auto_id(), customer_id, Column::new("bio", GeneratorKind::String)],
        ),
    ])
}

/// Settings directory holding `schema` and the given customization.
pub fn write_settings(dir: &Path, schema: &Schema, custom_jsonc: &str) -> anyhow::Result<Settings> {
    let settings = Settings::new(dir, "schema");
    settings.ensure_dirs()?;
    settings.write_schema(schema)?;
    fs::write(settings.custom_path(), custom_jsonc)?;
    Ok(settings)
}
