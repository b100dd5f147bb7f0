mod chunks;
mod content;
mod duplicates;
mod entities;
mod files;
mod issues;
mod projects;
mod stats;
mod usages;

pub use files::NewFile;
pub use usages::{EntitySpan, NamedEntity};

use crate::{backup::BackupManager, driver::RusqliteDriver, schema, Driver};
use codestore_core::{DriverConfig, Error, Result, Row, Schema, SchemaSyncResult, SqlValue};
use std::sync::Mutex;
use tracing::info;

/// The single entry point every other crate talks to, replacing
/// `base.py`'s `CodeDatabase` facade. Where the Python original used
/// `__getattr__` to splice driver methods onto itself at runtime, this is a
/// plain struct with inherent methods; the facade's public surface is
/// exactly what's declared here, not whatever the active driver happens to
/// expose.
///
/// Holds one mutex around the driver regardless of whether the concrete
/// driver reports itself thread-safe: the cost of an uncontended lock is
/// negligible next to a network or disk round trip, and a single lock path
/// is easier to reason about than branching per driver (spec §9 redesign
/// flag; one lock per instance, not a global lock table keyed by driver
/// name).
pub struct Store {
  driver: Mutex<Box<dyn Driver>>,
  schema: Schema,
  backup_manager: Option<BackupManager>,
}

impl Store {
  /// Opens (or creates) the database described by `config` and immediately
  /// reconciles its schema. Either step failing leaves no usable `Store`;
  /// there is no "connected but out of sync" state a caller could observe,
  /// matching `base.py.CodeDatabase.__init__`'s connect-then-sync_schema
  /// sequencing.
  pub fn connect(config: &DriverConfig) -> Result<Self> {
    let backup_manager = config.backup_dir().map(BackupManager::new);

    let store = match config {
      DriverConfig::InProcess { path, .. } => {
        let driver = RusqliteDriver::open(path)?;
        Self {
          driver: Mutex::new(Box::new(driver)),
          schema: schema::declarative_schema(),
          backup_manager,
        }
      }
      DriverConfig::Proxy {
        path,
        command_timeout,
        poll_interval,
        ..
      } => {
        let driver = crate::driver::ProxyDriver::connect(
          path,
          std::time::Duration::from_secs_f64(*command_timeout),
          std::time::Duration::from_secs_f64(*poll_interval),
        )?;
        Self {
          driver: Mutex::new(Box::new(driver)),
          schema: schema::declarative_schema(),
          backup_manager,
        }
      }
    };

    let result = store.sync_schema()?;
    if !result.success {
      return Err(Error::SchemaSync(result.error.unwrap_or_default()));
    }
    Ok(store)
  }

  /// A `Store` over an in-memory database, for tests. Always in-process.
  pub fn connect_in_memory() -> Result<Self> {
    let driver = RusqliteDriver::in_memory()?;
    let store = Self {
      driver: Mutex::new(Box::new(driver)),
      schema: schema::declarative_schema(),
      backup_manager: None,
    };
    let result = store.sync_schema()?;
    if !result.success {
      return Err(Error::SchemaSync(result.error.unwrap_or_default()));
    }
    Ok(store)
  }

  pub fn sync_schema(&self) -> Result<SchemaSyncResult> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    let result = schema::sync_schema(driver.as_mut(), &self.schema, self.backup_manager.as_ref());
    if result.success {
      info!(changes = result.changes_applied.len(), "schema sync applied");
    }
    Ok(result)
  }

  pub fn db_setting(&self, key: &str) -> Result<Option<String>> {
    let row = self.fetch_one("SELECT value FROM db_settings WHERE key = ?1", &[SqlValue::Text(key.to_string())])?;
    Ok(row.and_then(|r| r.get_str("value").map(str::to_string)))
  }

  pub fn set_db_setting(&self, key: &str, value: &str) -> Result<()> {
    self.execute(
      "INSERT INTO db_settings (key, value) VALUES (?1, ?2)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value",
      &[SqlValue::Text(key.to_string()), SqlValue::Text(value.to_string())],
    )?;
    Ok(())
  }

  // --- lock-guarded primitives, mirroring base.py's _execute/_fetchone/_fetchall ---

  pub(crate) fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.execute(sql, params)
  }

  pub(crate) fn fetch_one(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.fetch_one(sql, params)
  }

  pub(crate) fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.fetch_all(sql, params)
  }

  pub(crate) fn last_insert_rowid(&self) -> Result<i64> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.last_insert_rowid()
  }

  pub fn in_transaction(&self) -> bool {
    let driver = self.driver.lock().expect("store mutex poisoned");
    driver.in_transaction()
  }

  pub fn begin_transaction(&self) -> Result<()> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.begin_transaction()
  }

  pub fn commit_transaction(&self) -> Result<()> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.commit_transaction()
  }

  pub fn rollback_transaction(&self) -> Result<()> {
    let mut driver = self.driver.lock().expect("store mutex poisoned");
    driver.rollback_transaction()
  }

  /// Runs `f` inside a transaction, committing on `Ok` and rolling back on
  /// `Err` or panic-unwind, the way `base.py`'s `transaction()`
  /// contextmanager guarantees release on every exit path.
  pub fn transaction<T>(&self, f: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
    self.begin_transaction()?;
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(self)));
    match result {
      Ok(Ok(value)) => {
        self.commit_transaction()?;
        Ok(value)
      }
      Ok(Err(e)) => {
        let _ = self.rollback_transaction();
        Err(e)
      }
      Err(panic) => {
        let _ = self.rollback_transaction();
        std::panic::resume_unwind(panic);
      }
    }
  }
}
