//! The tables collection of a connection.
//!
//! Table objects are created on first access and cached. Disposing an object (or refreshing
//! the collection) only drops the in-memory object; the schema is never touched.

use super::metadata::MetadataSource;
use super::table::Table;
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::executor::CatalogExecutor;
use may::sync::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the table objects of one connection
pub struct Tables {
    executor: Arc<dyn CatalogExecutor>,
    metadata: Arc<dyn MetadataSource>,
    names: Vec<String>,
    default_table_type: String,
    log_statements: bool,
    objects: Mutex<HashMap<String, Arc<Table>>>,
}

impl Tables {
    pub fn new(
        executor: Arc<dyn CatalogExecutor>,
        metadata: Arc<dyn MetadataSource>,
        names: Vec<String>,
    ) -> Self {
        let defaults = CatalogConfig::default();
        Self {
            executor,
            metadata,
            names,
            default_table_type: defaults.default_table_type,
            log_statements: defaults.log_statements,
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Apply the table type and statement logging settings of `config`
    #[must_use]
    pub fn with_config(mut self, config: &CatalogConfig) -> Self {
        self.default_table_type = config.default_table_type.clone();
        self.log_statements = config.log_statements;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_by_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The table object for `name`, built from the catalog on first access
    ///
    /// # Errors
    ///
    /// `TableNotFound` for names outside the collection, `Metadata` if loading fails.
    pub fn get_by_name(&self, name: &str) -> Result<Arc<Table>, CatalogError> {
        if !self.has_by_name(name) {
            return Err(CatalogError::TableNotFound(name.to_string()));
        }

        if let Some(table) = self.lock_objects(name)?.get(name) {
            return Ok(Arc::clone(table));
        }

        // Catalog reads happen without the collection lock so other tables stay reachable
        let table = Table::existing(
            Arc::clone(&self.executor),
            Arc::clone(&self.metadata),
            name,
            self.default_table_type.clone(),
            String::new(),
        )?
        .with_statement_logging(self.log_statements);

        let mut objects = self.lock_objects(name)?;
        let table = objects
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("created table object \"{name}\"");
                Arc::new(table)
            });
        Ok(Arc::clone(table))
    }

    fn lock_objects(
        &self,
        name: &str,
    ) -> Result<MutexGuard<'_, HashMap<String, Arc<Table>>>, CatalogError> {
        self.objects
            .lock()
            .map_err(|_| CatalogError::LockPoisoned(name.to_string()))
    }

    /// Dispose and forget one cached table object
    pub fn dispose(&self, name: &str) {
        let removed = match self.objects.lock() {
            Ok(mut objects) => objects.remove(name),
            Err(poisoned) => poisoned.into_inner().remove(name),
        };
        if let Some(table) = removed {
            table.dispose();
        }
    }

    /// Dispose every cached object; the next access rebuilds it from the catalog
    pub fn refresh(&self) {
        let drained: Vec<Arc<Table>> = match self.objects.lock() {
            Ok(mut objects) => objects.drain().map(|(_, t)| t).collect(),
            Err(poisoned) => poisoned.into_inner().drain().map(|(_, t)| t).collect(),
        };
        for table in drained {
            table.dispose();
        }
    }
}
