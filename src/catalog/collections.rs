//! The columns, keys and indexes collections owned by a table.
//!
//! Each collection is a snapshot of catalog metadata for one table. `refresh` replaces the
//! snapshot wholesale; if the catalog read fails the previous contents stay in place.

use super::descriptor::ColumnDescriptor;
use super::metadata::MetadataSource;
use crate::error::CatalogError;

/// Kind of table key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Primary,
    Foreign,
    Unique,
}

/// Key (constraint) metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub name: String,
    pub key_type: KeyType,
}

/// Index metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub name: String,
    pub unique: bool,
    /// Full `CREATE INDEX` text as reported by the catalog
    pub definition: String,
}

/// Something a collection can hold and reload
pub trait CatalogEntry: Clone {
    fn entry_name(&self) -> &str;
    fn load(source: &dyn MetadataSource, table: &str) -> Result<Vec<Self>, CatalogError>;
}

impl CatalogEntry for ColumnDescriptor {
    fn entry_name(&self) -> &str {
        &self.name
    }

    fn load(source: &dyn MetadataSource, table: &str) -> Result<Vec<Self>, CatalogError> {
        source.load_columns(table)
    }
}

impl CatalogEntry for KeyDescriptor {
    fn entry_name(&self) -> &str {
        &self.name
    }

    fn load(source: &dyn MetadataSource, table: &str) -> Result<Vec<Self>, CatalogError> {
        source.load_keys(table)
    }
}

impl CatalogEntry for IndexDescriptor {
    fn entry_name(&self) -> &str {
        &self.name
    }

    fn load(source: &dyn MetadataSource, table: &str) -> Result<Vec<Self>, CatalogError> {
        source.load_indexes(table)
    }
}

/// Ordered, name-addressable catalog entries for one table
#[derive(Debug, Clone)]
pub struct CatalogCollection<T> {
    table: String,
    entries: Vec<T>,
}

pub type Columns = CatalogCollection<ColumnDescriptor>;
pub type Keys = CatalogCollection<KeyDescriptor>;
pub type Indexes = CatalogCollection<IndexDescriptor>;

impl<T: CatalogEntry> CatalogCollection<T> {
    /// An empty collection, as owned by a table that is not in the catalog yet
    pub fn empty(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            entries: Vec::new(),
        }
    }

    /// Build the collection from the catalog
    pub fn load(source: &dyn MetadataSource, table: impl Into<String>) -> Result<Self, CatalogError> {
        let mut collection = Self::empty(table);
        collection.refresh(source)?;
        Ok(collection)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.entry_name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.entry_name().to_string()).collect()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reload from the catalog
    pub fn refresh(&mut self, source: &dyn MetadataSource) -> Result<(), CatalogError> {
        let entries = T::load(source, &self.table)?;
        log::debug!("reloaded {} entries for table \"{}\"", entries.len(), self.table);
        self.entries = entries;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
