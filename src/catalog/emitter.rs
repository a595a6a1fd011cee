//! Statement emission.
//!
//! Maps each [`ChangeOp`] to the literal `ALTER TABLE "T" ALTER COLUMN "C" <clause>` text for
//! the target engine, or refuses it. Nothing here touches the connection.
//!
//! Identifiers are wrapped in double quotes and default values are inserted verbatim. Neither
//! is escaped further.
//!
//! A name change renders as `ALTER COLUMN "C" TO "D"`. PostgreSQL only accepts
//! `RENAME COLUMN`, so on PostgreSQL that statement is always rejected. Being last in the
//! batch, it fails after the type, nullability and default statements have been applied.

use super::descriptor::Nullability;
use super::diff::ChangeOp;
use super::type_part::TypeRenderer;
use crate::error::CatalogError;

const AUTOINCREMENT_UNSUPPORTED: &str =
    "changing autoincrement property of an existing column is not supported";

/// Renders change operations into DDL text
pub struct StatementEmitter<'a> {
    renderer: &'a dyn TypeRenderer,
}

impl<'a> StatementEmitter<'a> {
    pub fn new(renderer: &'a dyn TypeRenderer) -> Self {
        Self { renderer }
    }

    /// Render one operation
    ///
    /// Returns `Ok(None)` when the operation deliberately produces no statement (an `Unknown`
    /// nullability target).
    ///
    /// # Errors
    ///
    /// `CatalogError::UnsupportedOperation` for an autoincrement change.
    pub fn emit(
        &self,
        table: &str,
        column: &str,
        op: &ChangeOp,
    ) -> Result<Option<String>, CatalogError> {
        let prefix = alter_column_prefix(table, column);
        let sql = match op {
            ChangeOp::TypeChange(spec) => {
                format!("{prefix} TYPE {}", self.renderer.render_type_part(spec))
            }
            ChangeOp::NullabilityChange(Nullability::NoNulls) => format!("{prefix} SET NOT NULL"),
            ChangeOp::NullabilityChange(Nullability::Nullable) => format!("{prefix} DROP NOT NULL"),
            ChangeOp::NullabilityChange(Nullability::Unknown) => {
                log::warn!(
                    "attempting to set nullability of \"{table}\".\"{column}\" to unknown; leaving it unchanged"
                );
                return Ok(None);
            }
            ChangeOp::AutoIncrementChange(_) => {
                return Err(CatalogError::UnsupportedOperation(
                    AUTOINCREMENT_UNSUPPORTED.to_string(),
                ));
            }
            ChangeOp::DefaultChange(None) => format!("{prefix} DROP DEFAULT"),
            ChangeOp::DefaultChange(Some(value)) if value.is_empty() => {
                format!("{prefix} DROP DEFAULT")
            }
            ChangeOp::DefaultChange(Some(value)) => format!("{prefix} SET DEFAULT {value}"),
            ChangeOp::RenameChange(new_name) => format!("{prefix} TO \"{new_name}\""),
        };
        Ok(Some(sql))
    }

    /// Render a whole change list, in order
    ///
    /// Stops at the first refused operation, so a batch containing an autoincrement change
    /// never yields any statement.
    pub fn emit_all(
        &self,
        table: &str,
        column: &str,
        ops: &[ChangeOp],
    ) -> Result<Vec<String>, CatalogError> {
        let mut statements = Vec::with_capacity(ops.len());
        for op in ops {
            if let Some(sql) = self.emit(table, column, op)? {
                statements.push(sql);
            }
        }
        Ok(statements)
    }
}

/// `ALTER TABLE "<table>" ALTER COLUMN "<column>"`
#[must_use]
pub fn alter_column_prefix(table: &str, column: &str) -> String {
    format!("ALTER TABLE \"{table}\" ALTER COLUMN \"{column}\"")
}
