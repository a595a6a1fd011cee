//! Table catalog object.
//!
//! A `Table` wraps a table's identity, its privileges and its columns/keys/indexes
//! collections, and applies column alterations against the live connection.
//!
//! All mutation of a table happens under one lock. `alter_column` holds it from the diff until
//! the columns collection has been reloaded, so concurrent alterations of the same table run
//! one after another while different tables never contend.

use super::alter::{execute_statements, record_outcome, AlterPhase};
use super::collections::{Columns, IndexDescriptor, Indexes, KeyDescriptor, Keys};
use super::descriptor::ColumnDescriptor;
use super::diff::compute_changes;
use super::emitter::StatementEmitter;
use super::metadata::MetadataSource;
use super::type_part::{StandardTypeRenderer, TypeRenderer};
use crate::error::CatalogError;
use crate::executor::CatalogExecutor;
use bitflags::bitflags;
use may::sync::{Mutex, MutexGuard};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

bitflags! {
    /// Permission flags of a table
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Privileges: u32 {
        const SELECT    = 0x0001;
        const INSERT    = 0x0002;
        const UPDATE    = 0x0004;
        const DELETE    = 0x0008;
        const READ      = 0x0010;
        const CREATE    = 0x0020;
        const ALTER     = 0x0040;
        const REFERENCE = 0x0080;
        const DROP      = 0x0100;
    }
}

/// Whether the table is already in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built as a descriptor for a table that has not been created yet
    New,
    Existing,
}

/// Operations a consumer can ask a table object about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AlterColumn,
    Rename,
    Columns,
    Keys,
    Indexes,
    Privileges,
}

struct TableState {
    columns: Columns,
    keys: Keys,
    indexes: Indexes,
    disposed: bool,
}

/// A table in the catalog
pub struct Table {
    name: String,
    table_type: String,
    description: String,
    lifecycle: LifecycleState,
    privileges: Privileges,
    executor: Arc<dyn CatalogExecutor>,
    metadata: Arc<dyn MetadataSource>,
    renderer: Box<dyn TypeRenderer>,
    log_statements: bool,
    state: Mutex<TableState>,
}

impl Table {
    /// A table object for a table that does not exist yet
    ///
    /// It has no name, no privileges and empty collections.
    pub fn new_descriptor(
        executor: Arc<dyn CatalogExecutor>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        Self {
            name: String::new(),
            table_type: String::new(),
            description: String::new(),
            lifecycle: LifecycleState::New,
            privileges: Privileges::empty(),
            executor,
            metadata,
            renderer: Box::new(StandardTypeRenderer),
            log_statements: true,
            state: Mutex::new(TableState {
                columns: Columns::empty(""),
                keys: Keys::empty(""),
                indexes: Indexes::empty(""),
                disposed: false,
            }),
        }
    }

    /// A table object for a table that is already in the catalog
    ///
    /// Every privilege is granted and the three collections are loaded from `metadata`.
    ///
    /// # Errors
    ///
    /// `CatalogError::Metadata` if any collection cannot be read.
    pub fn existing(
        executor: Arc<dyn CatalogExecutor>,
        metadata: Arc<dyn MetadataSource>,
        name: impl Into<String>,
        table_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let columns = Columns::load(metadata.as_ref(), name.clone())?;
        let keys = Keys::load(metadata.as_ref(), name.clone())?;
        let indexes = Indexes::load(metadata.as_ref(), name.clone())?;

        Ok(Self {
            name,
            table_type: table_type.into(),
            description: description.into(),
            lifecycle: LifecycleState::Existing,
            // TODO: read the grants from information_schema.table_privileges instead of assuming the owner's full set
            privileges: Privileges::all(),
            executor,
            metadata,
            renderer: Box::new(StandardTypeRenderer),
            log_statements: true,
            state: Mutex::new(TableState {
                columns,
                keys,
                indexes,
                disposed: false,
            }),
        })
    }

    /// Replace the collaborator that renders `TYPE` clauses
    #[must_use]
    pub fn with_type_renderer(mut self, renderer: Box<dyn TypeRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Log executed statements at info (`true`) or debug (`false`)
    #[must_use]
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_type(&self) -> &str {
        &self.table_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn is_new(&self) -> bool {
        self.lifecycle == LifecycleState::New
    }

    /// The table's privileges
    ///
    /// # Errors
    ///
    /// `CatalogError::NotCommitted` for a table that is not in the catalog yet.
    pub fn privileges(&self) -> Result<Privileges, CatalogError> {
        self.ensure_existing()?;
        Ok(self.privileges)
    }

    /// Whether this object offers `capability`; renaming never is
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Rename => false,
            Capability::Privileges => self.lifecycle == LifecycleState::Existing,
            Capability::AlterColumn
            | Capability::Columns
            | Capability::Keys
            | Capability::Indexes => true,
        }
    }

    /// Renaming tables is not available on the target engine
    ///
    /// # Errors
    ///
    /// Always `CatalogError::UnsupportedOperation`.
    pub fn rename(&self, new_name: &str) -> Result<(), CatalogError> {
        log::debug!("refusing to rename table \"{}\" to \"{new_name}\"", self.name);
        Err(CatalogError::UnsupportedOperation(
            "table renaming is not supported by the target engine".to_string(),
        ))
    }

    /// Alter column `column_name` so it matches `proposed`
    ///
    /// The differences are applied as a sequence of `ALTER TABLE ... ALTER COLUMN` statements
    /// (type, nullability, default, rename, in that order). Every statement is rendered before
    /// the first one runs, so an unsupported change leaves the table untouched. Once execution
    /// starts, the first rejected statement aborts the batch; statements already applied are
    /// not rolled back. The columns collection is reloaded from the catalog on success, and
    /// also after a failure once at least one statement has been applied.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` if the autoincrement property would change
    /// - `ExecutionFailure` if the connection rejects a statement
    /// - `ColumnNotFound`, `NotCommitted`, `Disposed`, `Metadata`
    pub fn alter_column(
        &self,
        column_name: &str,
        proposed: &ColumnDescriptor,
    ) -> Result<(), CatalogError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::alter_column_span(&self.name, column_name).entered();

        let mut state = self.lock_state()?;
        self.ensure_existing()?;

        let mut phase = AlterPhase::Idle;
        let result = self.run_alteration(&mut state, column_name, proposed, &mut phase);
        if let Err(e) = &result {
            log::error!(
                "altering \"{}\".\"{column_name}\" failed while {phase}: {e}",
                self.name
            );
            phase = AlterPhase::Failed;
        }
        log::trace!("alteration of \"{}\".\"{column_name}\" ended {phase}", self.name);

        record_outcome(&result);
        result
    }

    fn run_alteration(
        &self,
        state: &mut TableState,
        column_name: &str,
        proposed: &ColumnDescriptor,
        phase: &mut AlterPhase,
    ) -> Result<(), CatalogError> {
        *phase = AlterPhase::Diffing;
        let existing = state
            .columns
            .get_by_name(column_name)
            .ok_or_else(|| CatalogError::ColumnNotFound {
                table: self.name.clone(),
                column: column_name.to_string(),
            })?;
        let changes = compute_changes(existing, proposed);
        log::debug!(
            "\"{}\".\"{column_name}\" differs in {:?}",
            self.name,
            existing.differing_properties(proposed)
        );

        *phase = AlterPhase::Emitting;
        let statements =
            StatementEmitter::new(self.renderer.as_ref()).emit_all(&self.name, column_name, &changes)?;

        *phase = AlterPhase::Executing;
        if let Err(e) = execute_statements(self.executor.as_ref(), &statements, self.log_statements) {
            if let CatalogError::ExecutionFailure { statement, .. } = &e {
                let applied = statements.iter().position(|s| s == statement).unwrap_or(0);
                if applied > 0 {
                    self.reload_after_partial_failure(state, applied);
                }
            }
            return Err(e);
        }

        *phase = AlterPhase::Refreshing;
        #[cfg(feature = "tracing")]
        let _refresh_span = tracing_helpers::refresh_columns_span(&self.name).entered();
        state.columns.refresh(self.metadata.as_ref())?;

        *phase = AlterPhase::Idle;
        Ok(())
    }

    /// Bring the columns collection in line with the statements that did commit
    ///
    /// A reload error is only logged; the caller reports the execution failure.
    fn reload_after_partial_failure(&self, state: &mut TableState, applied: usize) {
        log::warn!(
            "{applied} statement(s) on \"{}\" were applied before the failure; reloading columns",
            self.name
        );
        #[cfg(feature = "tracing")]
        let _refresh_span = tracing_helpers::refresh_columns_span(&self.name).entered();
        if let Err(e) = state.columns.refresh(self.metadata.as_ref()) {
            log::error!("reloading columns of \"{}\" failed: {e}", self.name);
        }
    }

    /// Current descriptor of one column
    pub fn column(&self, name: &str) -> Result<ColumnDescriptor, CatalogError> {
        let state = self.lock_state()?;
        state
            .columns
            .get_by_name(name)
            .cloned()
            .ok_or_else(|| CatalogError::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Snapshot of the columns collection
    pub fn columns(&self) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        Ok(self.lock_state()?.columns.entries().to_vec())
    }

    /// Snapshot of the keys collection
    pub fn keys(&self) -> Result<Vec<KeyDescriptor>, CatalogError> {
        Ok(self.lock_state()?.keys.entries().to_vec())
    }

    /// Snapshot of the indexes collection
    pub fn indexes(&self) -> Result<Vec<IndexDescriptor>, CatalogError> {
        Ok(self.lock_state()?.indexes.entries().to_vec())
    }

    /// Reload all three collections from the catalog
    pub fn refresh(&self) -> Result<(), CatalogError> {
        let mut state = self.lock_state()?;
        self.ensure_existing()?;
        state.columns.refresh(self.metadata.as_ref())?;
        state.keys.refresh(self.metadata.as_ref())?;
        state.indexes.refresh(self.metadata.as_ref())?;
        Ok(())
    }

    /// Release the collections; the table in the database is not touched
    pub fn dispose(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.columns.clear();
        state.keys.clear();
        state.indexes.clear();
        state.disposed = true;
        log::debug!("disposed table object \"{}\"", self.name);
    }

    pub fn is_disposed(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.disposed,
            Err(poisoned) => poisoned.into_inner().disposed,
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, TableState>, CatalogError> {
        let state = self
            .state
            .lock()
            .map_err(|_| CatalogError::LockPoisoned(self.name.clone()))?;
        if state.disposed {
            return Err(CatalogError::Disposed(self.name.clone()));
        }
        Ok(state)
    }

    fn ensure_existing(&self) -> Result<(), CatalogError> {
        match self.lifecycle {
            LifecycleState::Existing => Ok(()),
            LifecycleState::New => Err(CatalogError::NotCommitted(self.name.clone())),
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("table_type", &self.table_type)
            .field("lifecycle", &self.lifecycle)
            .field("privileges", &self.privileges)
            .finish_non_exhaustive()
    }
}
