//! The persistence layer: drivers that speak to SQLite directly or via a
//! proxy, the declarative-schema reconciler, the backup manager, and the
//! `Store` facade every other crate in the workspace talks to.

mod backup;
mod driver;
mod schema;
mod store;

pub use backup::BackupManager;
pub use driver::{Driver, ProxyDriver, RusqliteDriver, TransactionState};
pub use schema::{
  declarative_schema, generate_create_index_sql, generate_create_table_sql, generate_recreate_table_sql, sync_schema,
  MigrationPlan, SchemaComparator, SchemaPlanner,
};
pub use store::{EntitySpan, NamedEntity, NewFile, Store};
