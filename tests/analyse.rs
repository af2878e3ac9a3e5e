//! Schema introspection, persistence and insert semantics.

use datafill::testing::{shop_schema, write_settings, MemoryConnector};
use datafill::{analyse, DataGenerator, Settings, SkipHandle};
use fill_core::{
    Column, CustomSchema, DatabaseConnector, GeneratedValue, GeneratorKind, Monotonic, Row, Schema,
    Table,
};
use std::collections::HashMap;
use tempfile::TempDir;

#[tokio::test]
async fn test_analyse_persists_introspected_schema() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::new(temp_dir.path().join("settings"), "shop");
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();

    let schema = analyse(&connector, &settings).await.unwrap();

    assert_eq!(schema, shop_schema());
    assert_eq!(settings.load_schema().unwrap(), schema);
    assert_eq!(settings.load_custom().unwrap(), CustomSchema::default());
    assert!(settings.scripts_dir().is_dir());

    let orders = schema.get_table("orders").unwrap();
    assert_eq!(orders.referenced_tables, vec!["customers"]);
    let customer_id = orders.get_column("customer_id").unwrap();
    assert_eq!(customer_id.generator, GeneratorKind::ForeignKey);
}

#[tokio::test]
async fn test_analyse_keeps_existing_customization() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &Schema::default(),
        r#"{ "tables": [{ "name": "orders", "addLines": 5 }] }"#,
    )
    .unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();

    analyse(&connector, &settings).await.unwrap();

    let custom = settings.load_custom().unwrap();
    assert_eq!(custom.tables[0].add_lines, Some(5));
    assert_eq!(settings.load_schema().unwrap(), shop_schema());
}

#[test]
fn test_schema_json_round_trip() {
    let mut schema = shop_schema();
    schema.tables[0].columns[1]
        .foreign_key
        .as_mut()
        .unwrap()
        .where_condition = Some("active = 1".to_string());
    schema.tables[1].columns[1].nullable = 0.25;

    let json = schema.to_json().unwrap();
    assert!(json.contains("\"referencedTables\""));
    assert!(json.contains("\"where\": \"active = 1\""));
    assert_eq!(Schema::from_json(&json).unwrap(), schema);
}

#[tokio::test]
async fn test_insert_is_idempotent_on_unique_columns() {
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    let batch: Vec<Row> = ["ann@example.com", "bob@example.com"]
        .into_iter()
        .map(|email| {
            Row::from_iter([
                ("name", GeneratedValue::from("n")),
                ("email", GeneratedValue::from(email)),
            ])
        })
        .collect();

    assert_eq!(connector.insert("customers", &batch).await.unwrap(), 2);
    assert_eq!(connector.insert("customers", &batch).await.unwrap(), 0);
    assert_eq!(connector.count_lines("customers").await.unwrap(), 2);
}

#[tokio::test]
async fn test_monotonic_column_never_decreases() {
    let mut recorded_at = Column::new("recorded_at", GeneratorKind::Integer).with_range(0.0, 1000.0);
    recorded_at.monotonic = Monotonic::Asc;
    let mut remaining = Column::new("remaining", GeneratorKind::Real).with_range(0.0, 50.0);
    remaining.monotonic = Monotonic::Desc;
    let schema = Schema::new(vec![Table::new("readings", vec![recorded_at, remaining])]);

    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &schema,
        r#"{ "settings": { "maxRowsPerBatch": 7 }, "tables": [{ "name": "readings", "addLines": 100 }] }"#,
    )
    .unwrap();
    let connector = MemoryConnector::new(schema).await.unwrap();

    DataGenerator::new(settings)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    let ascending: Vec<i64> = connector
        .column_values("readings", "recorded_at")
        .iter()
        .filter_map(GeneratedValue::as_i64)
        .collect();
    assert_eq!(ascending.len(), 100);
    assert!(ascending.windows(2).all(|w| w[0] <= w[1]));
    assert!(ascending.iter().all(|v| (0..=1000).contains(v)));

    let descending: Vec<f64> = connector
        .column_values("readings", "remaining")
        .iter()
        .filter_map(GeneratedValue::as_f64)
        .collect();
    assert_eq!(descending.len(), 100);
    assert!(descending.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_row_counts_feed_delta_rows() {
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &shop_schema(),
        r#"{ "tables": [{ "name": "customers", "maxLines": 3 }, { "name": "orders", "addLines": 2 }] }"#,
    )
    .unwrap();

    let plan = DataGenerator::new(settings).plan(&connector).await.unwrap();
    let deltas: HashMap<&str, u64> = plan
        .tables
        .iter()
        .map(|t| (t.name.as_str(), t.delta_rows))
        .collect();
    assert_eq!(deltas["customers"], 3);
    assert_eq!(deltas["orders"], 2);
}
