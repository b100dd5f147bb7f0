mod in_process;
mod proxy;

pub use in_process::RusqliteDriver;
pub use proxy::ProxyDriver;

use codestore_core::{Result, Row, SqlValue};

/// A transaction's lifecycle, shared by every driver implementation
/// (spec §4.1): `Idle -> Active(tx_id) -> {Committed, RolledBack} -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
  Idle,
  Active(u64),
}

/// The seam between the persistence facade and a concrete database backend.
///
/// Two implementations exist: [`RusqliteDriver`] talks to a local SQLite file
/// directly and is *not* thread-safe (SQLite connections aren't `Sync`); the
/// facade wraps it in a mutex. [`ProxyDriver`] forwards every call over IPC
/// to a worker process that owns the file exclusively, so the serialization
/// point lives in the worker rather than in this process; it reports itself
/// thread-safe.
pub trait Driver: Send {
  fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;

  fn fetch_one(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>>;

  fn fetch_all(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

  fn last_insert_rowid(&mut self) -> Result<i64>;

  fn begin_transaction(&mut self) -> Result<()>;

  fn commit_transaction(&mut self) -> Result<()>;

  fn rollback_transaction(&mut self) -> Result<()>;

  fn in_transaction(&self) -> bool;

  fn table_info(&mut self, table: &str) -> Result<Vec<codestore_core::ColumnInfo>>;

  /// Whether callers may share this driver across threads without an
  /// external lock. `RusqliteDriver` is `false`; `ProxyDriver` is `true`.
  fn is_thread_safe(&self) -> bool;

  /// Exposes the raw SQLite connection when this driver holds one
  /// in-process, so the backup manager can run an online backup before a
  /// destructive migration. `ProxyDriver` has no local connection to offer;
  /// its worker is responsible for backing up before applying a migration
  /// it receives over `SyncSchema`.
  fn raw_connection(&self) -> Option<&rusqlite::Connection> {
    None
  }
}
