use codestore_core::{ColumnInfo, DriverConfig, Result, Schema};
use codestore_db::{declarative_schema, sync_schema, BackupManager, Driver, RusqliteDriver};
use codestore_ipc::{
  BeginTransactionResult, CommitTransactionResult, ExecuteParams, ExecuteResult, FetchAllParams, FetchAllResult,
  FetchOneParams, FetchOneResult, LastInsertRowidResult, Method, PingResult, RollbackTransactionResult, SyncSchemaResult,
  TableColumn, TableInfoParams, TableInfoResult,
};
use std::sync::Mutex;
use tracing::{error, info};

/// Owns the one `RusqliteDriver` connection that exclusively holds the
/// database file, dispatching `Method` commands a `ProxyDriver` forwards
/// (spec §4.1/§6). Every command is serialized through `driver`'s mutex;
/// this is the "worker process serializes access internally" half of spec
/// §5's concurrency model, the counterpart to the facade's own mutex for
/// in-process use.
pub struct DbWorker {
  driver: Mutex<RusqliteDriver>,
  schema: Schema,
  backup: Option<BackupManager>,
}

impl DbWorker {
  pub fn open(config: &DriverConfig) -> Result<Self> {
    if config.is_proxy() {
      return Err(codestore_core::Error::Config("daemon worker requires an in-process driver config".to_string()));
    }

    let driver = RusqliteDriver::open(config.path())?;
    let backup = config.backup_dir().map(BackupManager::new);

    Ok(Self {
      driver: Mutex::new(driver),
      schema: declarative_schema(),
      backup,
    })
  }

  /// Runs schema reconciliation once, the way the facade does on
  /// construction (spec §4.4): "on construction it calls connect, then
  /// sync_schema; either failure raises and the facade is unusable."
  pub fn sync_schema(&self) -> SyncSchemaResult {
    let mut driver = self.driver.lock().expect("db worker mutex poisoned");
    let result = sync_schema(&mut *driver, &self.schema, self.backup.as_ref());
    SyncSchemaResult {
      success: result.success,
      changes_applied: result.changes_applied,
      error: result.error,
    }
  }

  /// Executes one `Method`, returning the JSON payload a `Response` wraps.
  /// `tx_id` bookkeeping is the proxy driver's job on the client side;
  /// this worker trusts that a client only sends `tx_id: Some(_)` while its
  /// own `begin_transaction` call is outstanding, since only one
  /// transaction can be active on this connection at a time.
  pub fn handle(&self, method: Method, params: serde_json::Value) -> Result<serde_json::Value> {
    let mut driver = self.driver.lock().expect("db worker mutex poisoned");

    let value = match method {
      Method::Ping => serde_json::to_value(PingResult { ok: true })?,
      Method::Execute => {
        let p: ExecuteParams = serde_json::from_value(params)?;
        let rows_affected = driver.execute(&p.sql, &p.params)?;
        serde_json::to_value(ExecuteResult { rows_affected })?
      }
      Method::FetchOne => {
        let p: FetchOneParams = serde_json::from_value(params)?;
        let row = driver.fetch_one(&p.sql, &p.params)?;
        serde_json::to_value(FetchOneResult { row })?
      }
      Method::FetchAll => {
        let p: FetchAllParams = serde_json::from_value(params)?;
        let rows = driver.fetch_all(&p.sql, &p.params)?;
        serde_json::to_value(FetchAllResult { rows })?
      }
      Method::LastInsertRowid => {
        let rowid = driver.last_insert_rowid()?;
        serde_json::to_value(LastInsertRowidResult { rowid })?
      }
      Method::BeginTransaction => {
        driver.begin_transaction()?;
        serde_json::to_value(BeginTransactionResult { tx_id: 1 })?
      }
      Method::CommitTransaction => {
        driver.commit_transaction()?;
        serde_json::to_value(CommitTransactionResult {})?
      }
      Method::RollbackTransaction => {
        driver.rollback_transaction()?;
        serde_json::to_value(RollbackTransactionResult {})?
      }
      Method::TableInfo => {
        let p: TableInfoParams = serde_json::from_value(params)?;
        let columns: Vec<ColumnInfo> = driver.table_info(&p.table)?;
        serde_json::to_value(TableInfoResult {
          columns: columns.into_iter().map(TableColumn::from).collect(),
        })?
      }
      Method::SyncSchema => {
        drop(driver);
        return Ok(serde_json::to_value(self.sync_schema())?);
      }
    };

    Ok(value)
  }
}

impl Drop for DbWorker {
  fn drop(&mut self) {
    info!("db worker shutting down");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn in_memory_config() -> DriverConfig {
    DriverConfig::InProcess {
      path: ":memory:".to_string(),
      backup_dir: None,
    }
  }

  #[test]
  fn handles_a_ping() {
    let worker = DbWorker::open(&in_memory_config()).unwrap();
    let sync = worker.sync_schema();
    assert!(sync.success, "{:?}", sync.error);

    let result = worker.handle(Method::Ping, serde_json::json!({})).unwrap();
    let ping: PingResult = serde_json::from_value(result).unwrap();
    assert!(ping.ok);
  }

  #[test]
  fn runs_a_transaction_round_trip() {
    let worker = DbWorker::open(&in_memory_config()).unwrap();
    assert!(worker.sync_schema().success);

    worker.handle(Method::BeginTransaction, serde_json::json!({})).unwrap();
    worker
      .handle(
        Method::Execute,
        serde_json::to_value(ExecuteParams {
          sql: "INSERT INTO projects (id, root_path, name) VALUES ('0199476f-0000-7000-8000-000000000000', '/tmp', 'demo')".to_string(),
          params: vec![],
        })
        .unwrap(),
      )
      .unwrap();
    worker.handle(Method::CommitTransaction, serde_json::json!({})).unwrap();
  }
}
