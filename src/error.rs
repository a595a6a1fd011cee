//! Catalog error types

use crate::executor::ExecError;

/// Errors raised by table catalog objects and their collections
#[derive(Debug)]
pub enum CatalogError {
    /// The target engine cannot perform the requested operation
    UnsupportedOperation(String),
    /// The connection rejected a rendered statement
    ExecutionFailure { statement: String, source: ExecError },
    /// The column does not exist in the table's columns collection
    ColumnNotFound { table: String, column: String },
    /// No table of that name in the tables collection
    TableNotFound(String),
    /// The table has not been committed to the catalog yet
    NotCommitted(String),
    /// The table object was disposed by its owning collection
    Disposed(String),
    /// A descriptor property key outside the recognized set
    UnknownProperty(String),
    /// Reading or mapping catalog metadata failed
    Metadata(String),
    /// A previous holder of the table lock panicked
    LockPoisoned(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            CatalogError::ExecutionFailure { statement, source } => {
                write!(f, "Statement failed: {}\nStatement: {}", source, statement)
            }
            CatalogError::ColumnNotFound { table, column } => {
                write!(f, "Column '{}' not found in table '{}'", column, table)
            }
            CatalogError::TableNotFound(table) => write!(f, "Table '{}' not found", table),
            CatalogError::NotCommitted(table) => write!(
                f,
                "Table '{}' has not been created in the catalog yet",
                table
            ),
            CatalogError::Disposed(table) => {
                write!(f, "Table object '{}' has been disposed", table)
            }
            CatalogError::UnknownProperty(key) => {
                write!(f, "Unknown column descriptor property: {}", key)
            }
            CatalogError::Metadata(msg) => write!(f, "Catalog metadata error: {}", msg),
            CatalogError::LockPoisoned(table) => {
                write!(f, "Lock for table '{}' is poisoned", table)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::ExecutionFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExecError> for CatalogError {
    fn from(error: ExecError) -> Self {
        CatalogError::Metadata(error.to_string())
    }
}

impl CatalogError {
    /// True for errors the engine raises before producing any statement text
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CatalogError::UnsupportedOperation(_))
    }
}
