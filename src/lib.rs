//! # Tableguard
//!
//! Table catalog objects for PostgreSQL, with an engine that turns a column descriptor change
//! into ordered `ALTER TABLE ... ALTER COLUMN` statements and runs them over `may_postgres`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tableguard::{connect, CatalogConfig, MayPostgresExecutor, PgMetadataSource, Tables};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CatalogConfig::load()?;
//! let executor = Arc::new(MayPostgresExecutor::new(connect(&config.url)?));
//! let metadata = Arc::new(PgMetadataSource::new(executor.clone()));
//! let tables = Tables::new(executor, metadata, vec!["orders".into()]).with_config(&config);
//!
//! let orders = tables.get_by_name("orders")?;
//! let total = orders.column("total")?.with_precision(14).with_scale(2);
//! orders.alter_column("total", &total)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod metrics;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use catalog::{
    compute_changes, data_type, Capability, ChangeOp, ColumnDescriptor, ColumnProperty,
    IndexDescriptor, KeyDescriptor, KeyType, LifecycleState, MetadataSource, Nullability,
    PgMetadataSource, Privileges, StandardTypeRenderer, StatementEmitter, Table, Tables,
    TypeRenderer, TypeSpec,
};
pub use config::CatalogConfig;
pub use connection::{connect, ConnectionError};
pub use error::CatalogError;
pub use executor::{CatalogExecutor, ExecError, MayPostgresExecutor};
