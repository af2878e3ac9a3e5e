//! End-to-end generation against the in-memory connector.

use datafill::progress::{step, ProgressEvent, ProgressListener, ProgressState};
use datafill::testing::{shop_schema, write_settings, MemoryConnector};
use datafill::{DataGenerator, RecordingProgress, Settings, SkipHandle};
use fill_core::{DatabaseConnector, FillError, GeneratedValue, Row};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const SHOP_CUSTOM: &str = r#"{
    // reproducible runs
    "settings": { "seed": 42, "maxRowsPerBatch": 4 },
    "tables": [
        { "name": "customers", "addLines": 5 },
        { "name": "orders", "addLines": 20 }
    ]
}"#;

fn done_tables(events: &[ProgressEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.state == ProgressState::Done)
        .map(|e| e.current_table.clone())
        .collect()
}

#[tokio::test]
async fn test_orders_reference_existing_customers() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &shop_schema(), SHOP_CUSTOM).unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    let progress = Arc::new(RecordingProgress::new());

    let stats = DataGenerator::new(settings)
        .with_progress(progress.clone())
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    assert_eq!(connector.count_lines("customers").await.unwrap(), 5);
    assert_eq!(connector.count_lines("orders").await.unwrap(), 20);
    assert_eq!(stats.inserted(), 25);

    let customer_ids: HashSet<i64> = connector
        .column_values("customers", "id")
        .iter()
        .filter_map(GeneratedValue::as_i64)
        .collect();
    assert_eq!(customer_ids, (1..=5).collect());
    for value in connector.column_values("orders", "customer_id") {
        assert!(customer_ids.contains(&value.as_i64().unwrap()));
    }
    for status in connector.column_values("orders", "status") {
        assert!(matches!(status.as_str(), Some("new") | Some("paid")));
    }

    // customers is declared after orders but must be filled first
    assert_eq!(done_tables(&progress.events()), vec!["customers", "orders"]);
}

#[tokio::test]
async fn test_batches_respect_max_rows_per_batch() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &shop_schema(), SHOP_CUSTOM).unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    let progress = Arc::new(RecordingProgress::new());

    DataGenerator::new(settings)
        .with_progress(progress.clone())
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    let orders_progress: Vec<u64> = progress
        .events()
        .iter()
        .filter(|e| e.current_table == "orders" && e.step == step::GENERATE)
        .map(|e| e.current_value)
        .collect();
    assert_eq!(orders_progress, vec![0, 4, 8, 12, 16, 20]);
}

#[tokio::test]
async fn test_max_lines_tops_up_existing_rows() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &shop_schema(),
        r#"{ "tables": [{ "name": "customers", "maxLines": 10 }] }"#,
    )
    .unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    let existing: Vec<Row> = (0..4)
        .map(|i| {
            Row::from_iter([
                ("name", GeneratedValue::from("existing")),
                ("email", GeneratedValue::from(format!("user{i}@example.com"))),
            ])
        })
        .collect();
    connector.insert("customers", &existing).await.unwrap();

    let stats = DataGenerator::new(settings)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    assert_eq!(stats.get("customers").unwrap().requested, 6);
    assert_eq!(connector.count_lines("customers").await.unwrap(), 10);
    assert!(stats.get("orders").is_none());

    // A second run has nothing left to add
    let stats = DataGenerator::new(Settings::new(temp_dir.path(), "schema"))
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();
    assert!(stats.tables.is_empty());
    assert_eq!(connector.count_lines("customers").await.unwrap(), 10);
}

#[tokio::test]
async fn test_reset_empties_tables_first() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &shop_schema(), SHOP_CUSTOM).unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();

    DataGenerator::new(settings.clone())
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();
    DataGenerator::new(settings)
        .with_reset(true)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    assert_eq!(connector.count_lines("customers").await.unwrap(), 5);
    assert_eq!(connector.count_lines("orders").await.unwrap(), 20);
    // identity counters restart
    assert_eq!(
        connector.column_values("customers", "id").first(),
        Some(&GeneratedValue::Int64(1))
    );
}

/// Requests a skip once the first batch of a table is inserted.
struct SkipAfterFirstBatch {
    table: &'static str,
    skip: SkipHandle,
}

impl ProgressListener for SkipAfterFirstBatch {
    fn on_progress(&self, event: &ProgressEvent) {
        if event.current_table == self.table && event.step == step::GENERATE && event.current_value > 0 {
            self.skip.request();
        }
    }
}

#[tokio::test]
async fn test_skip_moves_to_next_table() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &shop_schema(), SHOP_CUSTOM).unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    let skip = SkipHandle::new();
    let listener = Arc::new(SkipAfterFirstBatch {
        table: "customers",
        skip: skip.clone(),
    });

    let stats = DataGenerator::new(settings)
        .with_progress(listener)
        .run(&connector, skip)
        .await
        .unwrap();

    let customers = stats.get("customers").unwrap();
    assert!(customers.skipped);
    assert_eq!(customers.inserted, 4);
    assert_eq!(connector.count_lines("customers").await.unwrap(), 4);
    // orders still filled, drawing from the customers that exist
    assert_eq!(connector.count_lines("orders").await.unwrap(), 20);
    assert!(!stats.get("orders").unwrap().skipped);
}

#[tokio::test]
async fn test_failed_batch_is_counted_as_lost() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &shop_schema(), SHOP_CUSTOM).unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    connector.fail_inserts("orders");

    let stats = DataGenerator::new(settings)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    let orders = stats.get("orders").unwrap();
    assert_eq!(orders.generated, 20);
    assert_eq!(orders.lost, 20);
    assert_eq!(orders.inserted, 0);
    assert_eq!(connector.count_lines("customers").await.unwrap(), 5);
}

#[tokio::test]
async fn test_scripts_run_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &shop_schema(),
        r#"{
            "settings": { "beforeAll": ["SET @phase = 'before'"], "afterAll": ["ANALYZE TABLE orders"] },
            "tables": [{
                "name": "customers",
                "addLines": 1,
                "before": ["DELETE FROM audit"],
                "after": ["UPDATE customers SET name = 'x'"]
            }]
        }"#,
    )
    .unwrap();
    fs::write(settings.scripts_dir().join("02_second.sql"), "SELECT 2").unwrap();
    fs::write(settings.scripts_dir().join("01_first.sql"), "SELECT 1").unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();

    DataGenerator::new(settings)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap();

    assert_eq!(
        connector.queries(),
        vec![
            "SELECT 1",
            "SELECT 2",
            "SET @phase = 'before'",
            "DELETE FROM audit",
            "UPDATE customers SET name = 'x'",
            "ANALYZE TABLE orders",
        ]
    );
}

#[tokio::test]
async fn test_failing_before_script_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &shop_schema(),
        r#"{ "tables": [{ "name": "customers", "addLines": 3, "before": ["DROP VIEW broken"] }] }"#,
    )
    .unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();
    connector.fail_queries_containing("broken");

    let err = DataGenerator::new(settings)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<FillError>() {
        Some(FillError::ScriptExecution { script, .. }) => assert_eq!(script, "DROP VIEW broken"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(connector.count_lines("customers").await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_configuration_reported_before_any_write() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(
        temp_dir.path(),
        &shop_schema(),
        r#"{
            "settings": { "beforeAll": ["SELECT 1"] },
            "tables": [
                { "name": "customers", "addLines": 3, "columns": [{ "name": "name", "generator": "integer" }] },
                { "name": "orders", "addLines": 3, "columns": [{ "name": "total", "min": 10, "max": 1 }] }
            ]
        }"#,
    )
    .unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();

    let err = DataGenerator::new(settings)
        .run(&connector, SkipHandle::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<FillError>() {
        Some(FillError::GeneratorConfig(errors)) => {
            let columns: Vec<String> = errors
                .iter()
                .map(|e| format!("{}.{}", e.table, e.column))
                .collect();
            assert_eq!(columns, vec!["orders.total", "customers.name"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(connector.queries().is_empty());
    assert_eq!(connector.count_lines("customers").await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_schema_file_asks_for_analyse() {
    let temp_dir = TempDir::new().unwrap();
    let connector = MemoryConnector::new(shop_schema()).await.unwrap();

    let err = DataGenerator::new(Settings::new(temp_dir.path(), "schema"))
        .run(&connector, SkipHandle::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FillError>(),
        Some(FillError::Configuration(message)) if message.contains("--analyse")
    ));
}
