//! In-memory stand-ins for the connection and the catalog, used by unit and integration tests.

use crate::catalog::collections::{IndexDescriptor, KeyDescriptor};
use crate::catalog::descriptor::ColumnDescriptor;
use crate::catalog::metadata::MetadataSource;
use crate::error::CatalogError;
use crate::executor::{CatalogExecutor, ExecError};
use may_postgres::types::ToSql;
use may_postgres::Row;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Executor that records every statement it is asked to run
///
/// `failing_at(n)` rejects the n-th `execute` call (1-based). The rejected statement is still
/// recorded, since it did reach the connection.
#[derive(Default)]
pub struct RecordingExecutor {
    executed: Mutex<Vec<String>>,
    fail_at: Option<usize>,
    delay: Option<Duration>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(statement: usize) -> Self {
        Self {
            fail_at: Some(statement),
            ..Self::default()
        }
    }

    /// Sleep inside every `execute` call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl CatalogExecutor for RecordingExecutor {
    fn execute(&self, query: &str, _params: &[&dyn ToSql]) -> Result<u64, ExecError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let mut executed = self.executed.lock().unwrap();
        executed.push(query.to_string());
        if self.fail_at == Some(executed.len()) {
            return Err(ExecError::QueryError(format!("rejected: {query}")));
        }
        Ok(0)
    }

    fn query_all(&self, _query: &str, _params: &[&dyn ToSql]) -> Result<Vec<Row>, ExecError> {
        // Row has no public constructor
        Ok(vec![])
    }
}

/// Catalog with fixed, replaceable contents
#[derive(Default)]
pub struct StaticMetadata {
    columns: Mutex<HashMap<String, Vec<ColumnDescriptor>>>,
    keys: Mutex<HashMap<String, Vec<KeyDescriptor>>>,
    indexes: Mutex<HashMap<String, Vec<IndexDescriptor>>>,
    column_loads: Mutex<HashMap<String, usize>>,
    fail: AtomicBool,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(self, table: &str, columns: Vec<ColumnDescriptor>) -> Self {
        self.set_columns(table, columns);
        self
    }

    pub fn with_keys(self, table: &str, keys: Vec<KeyDescriptor>) -> Self {
        self.keys.lock().unwrap().insert(table.to_string(), keys);
        self
    }

    pub fn with_indexes(self, table: &str, indexes: Vec<IndexDescriptor>) -> Self {
        self.indexes.lock().unwrap().insert(table.to_string(), indexes);
        self
    }

    /// Replace a table's columns, as a DDL statement would
    pub fn set_columns(&self, table: &str, columns: Vec<ColumnDescriptor>) {
        self.columns.lock().unwrap().insert(table.to_string(), columns);
    }

    /// How often the columns of `table` were read
    pub fn column_loads(&self, table: &str) -> usize {
        self.column_loads.lock().unwrap().get(table).copied().unwrap_or(0)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CatalogError::Metadata("catalog unavailable".to_string()));
        }
        Ok(())
    }
}

impl MetadataSource for StaticMetadata {
    fn load_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        self.check()?;
        *self.column_loads.lock().unwrap().entry(table.to_string()).or_insert(0) += 1;
        Ok(self.columns.lock().unwrap().get(table).cloned().unwrap_or_default())
    }

    fn load_keys(&self, table: &str) -> Result<Vec<KeyDescriptor>, CatalogError> {
        self.check()?;
        Ok(self.keys.lock().unwrap().get(table).cloned().unwrap_or_default())
    }

    fn load_indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>, CatalogError> {
        self.check()?;
        Ok(self.indexes.lock().unwrap().get(table).cloned().unwrap_or_default())
    }
}
