//! Integration tests for column alteration through the public API
//!
//! These run against the in-memory executor and catalog from `tableguard::test_helpers`,
//! so no database is needed.

use std::sync::Arc;
use tableguard::test_helpers::{RecordingExecutor, StaticMetadata};
use tableguard::{
    data_type, CatalogError, ColumnDescriptor, Nullability, StandardTypeRenderer, StatementEmitter,
    Tables,
};

fn quantity() -> ColumnDescriptor {
    ColumnDescriptor::new("QTY", data_type::INTEGER, "INTEGER").with_nullability(Nullability::NoNulls)
}

fn setup(executor: RecordingExecutor) -> (Arc<RecordingExecutor>, Arc<StaticMetadata>, Tables) {
    let executor = Arc::new(executor);
    let metadata = Arc::new(StaticMetadata::new().with_columns("ORDERS", vec![quantity()]));
    let tables = Tables::new(executor.clone(), metadata.clone(), vec!["ORDERS".to_string()]);
    (executor, metadata, tables)
}

#[test]
fn test_type_nullability_and_default_in_order() {
    let (executor, metadata, tables) = setup(RecordingExecutor::new());
    let orders = tables.get_by_name("ORDERS").unwrap();

    let proposed = quantity()
        .with_type(data_type::BIGINT, "BIGINT")
        .with_nullability(Nullability::Nullable)
        .with_default("0");
    metadata.set_columns("ORDERS", vec![proposed.clone()]);
    orders.alter_column("QTY", &proposed).unwrap();

    assert_eq!(
        executor.executed(),
        vec![
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" TYPE BIGINT",
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" DROP NOT NULL",
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" SET DEFAULT 0",
        ]
    );
    assert_eq!(orders.column("QTY").unwrap(), proposed);
}

#[test]
fn test_int_not_null_to_nullable_bigint_with_quoted_default() {
    let executor = Arc::new(RecordingExecutor::new());
    let existing =
        ColumnDescriptor::new("C", data_type::INTEGER, "INT").with_nullability(Nullability::NoNulls);
    let metadata = Arc::new(StaticMetadata::new().with_columns("T", vec![existing.clone()]));
    let tables = Tables::new(executor.clone(), metadata, vec!["T".to_string()]);

    let proposed = existing
        .with_type(data_type::BIGINT, "BIGINT")
        .with_nullability(Nullability::Nullable)
        .with_default("'0'");
    tables.get_by_name("T").unwrap().alter_column("C", &proposed).unwrap();

    assert_eq!(
        executor.executed(),
        vec![
            "ALTER TABLE \"T\" ALTER COLUMN \"C\" TYPE BIGINT",
            "ALTER TABLE \"T\" ALTER COLUMN \"C\" DROP NOT NULL",
            "ALTER TABLE \"T\" ALTER COLUMN \"C\" SET DEFAULT '0'",
        ]
    );
}

#[test]
fn test_identical_descriptor_runs_nothing() {
    let (executor, metadata, tables) = setup(RecordingExecutor::new());
    let orders = tables.get_by_name("ORDERS").unwrap();

    orders.alter_column("QTY", &quantity()).unwrap();

    assert!(executor.executed().is_empty());
    // the columns collection is reloaded even when nothing changed
    assert_eq!(metadata.column_loads("ORDERS"), 2);
}

#[test]
fn test_autoincrement_change_is_rejected_before_anything_runs() {
    let (executor, _, tables) = setup(RecordingExecutor::new());
    let orders = tables.get_by_name("ORDERS").unwrap();

    let proposed = quantity()
        .with_type(data_type::BIGINT, "BIGINT")
        .with_auto_increment(true);
    let err = orders.alter_column("QTY", &proposed).unwrap_err();

    assert!(err.is_unsupported());
    assert!(executor.executed().is_empty());
}

#[test]
fn test_rename_is_never_supported() {
    let (executor, _, tables) = setup(RecordingExecutor::new());
    let orders = tables.get_by_name("ORDERS").unwrap();

    assert!(matches!(
        orders.rename("PURCHASES"),
        Err(CatalogError::UnsupportedOperation(_))
    ));
    assert!(executor.executed().is_empty());
    assert_eq!(orders.name(), "ORDERS");
}

#[test]
fn test_default_set_then_dropped() {
    let (executor, metadata, tables) = setup(RecordingExecutor::new());
    let orders = tables.get_by_name("ORDERS").unwrap();

    let with_default = quantity().with_default("1");
    metadata.set_columns("ORDERS", vec![with_default.clone()]);
    orders.alter_column("QTY", &with_default).unwrap();

    let cleared = quantity().with_default("");
    metadata.set_columns("ORDERS", vec![quantity()]);
    orders.alter_column("QTY", &cleared).unwrap();

    assert_eq!(
        executor.executed(),
        vec![
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" SET DEFAULT 1",
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" DROP DEFAULT",
        ]
    );
}

#[test]
fn test_unknown_nullability_emits_nothing() {
    let (executor, _, tables) = setup(RecordingExecutor::new());
    let orders = tables.get_by_name("ORDERS").unwrap();

    let proposed = quantity().with_nullability(Nullability::Unknown);
    orders.alter_column("QTY", &proposed).unwrap();

    assert!(executor.executed().is_empty());
}

#[test]
fn test_failure_mid_batch_keeps_earlier_statements() {
    let (executor, metadata, tables) = setup(RecordingExecutor::failing_at(2));
    let orders = tables.get_by_name("ORDERS").unwrap();
    let loads_before = metadata.column_loads("ORDERS");

    let proposed = quantity()
        .with_type(data_type::BIGINT, "BIGINT")
        .with_nullability(Nullability::Nullable)
        .with_default("0");
    let committed = quantity().with_type(data_type::BIGINT, "BIGINT");
    metadata.set_columns("ORDERS", vec![committed.clone()]);
    let err = orders.alter_column("QTY", &proposed).unwrap_err();

    match err {
        CatalogError::ExecutionFailure { statement, .. } => {
            assert_eq!(statement, "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" DROP NOT NULL");
        }
        other => panic!("expected ExecutionFailure, got {other:?}"),
    }
    // the TYPE statement ran, the DEFAULT statement never did
    assert_eq!(executor.executed().len(), 2);
    // the committed TYPE change is visible to the next diff
    assert_eq!(metadata.column_loads("ORDERS"), loads_before + 1);
    assert_eq!(orders.column("QTY").unwrap(), committed);
}

#[test]
fn test_rename_change_is_emitted_last() {
    let proposed = quantity().with_name("QUANTITY").with_nullability(Nullability::Nullable);
    let changes = tableguard::compute_changes(&quantity(), &proposed);
    let renderer = StandardTypeRenderer;
    let statements = StatementEmitter::new(&renderer)
        .emit_all("ORDERS", "QTY", &changes)
        .unwrap();

    assert_eq!(
        statements,
        vec![
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" DROP NOT NULL",
            "ALTER TABLE \"ORDERS\" ALTER COLUMN \"QTY\" TO \"QUANTITY\"",
        ]
    );
}
