use super::Driver;
use codestore_core::{ColumnInfo, Error, Result, Row, SqlValue};
use codestore_ipc::{
  BeginTransactionParams, CommitTransactionParams, ExecuteParams, ExecuteResult, FetchAllParams, FetchAllResult,
  FetchOneParams, FetchOneResult, LastInsertRowidParams, LastInsertRowidResult, Method, Request,
  RollbackTransactionParams, TableInfoParams, TableInfoResult,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

type Pending = HashMap<u64, serde_json::Value>;

/// Forwards every database command over a Unix socket to a worker process
/// that exclusively owns the SQLite file, instead of opening the file in
/// this process. The multiplexing shape (background reader thread feeding a
/// shared pending-response table) is grounded on the `sink`/`stream` split
/// in `JoeyEamigh-ccmemory`'s `ipc::client::Client::multiplexer`, adapted
/// to a blocking transport since `Driver` is a synchronous trait.
///
/// Thread-safe: the worker process, not this struct, is the serialization
/// point for the underlying connection, so several `ProxyDriver` instances
/// (or clones sharing the facade's handle) may issue commands concurrently.
pub struct ProxyDriver {
  writer: UnixStream,
  next_id: u64,
  tx_id: Option<u64>,
  command_timeout: Duration,
  poll_interval: Duration,
  pending: Arc<(Mutex<Pending>, Condvar)>,
}

impl ProxyDriver {
  pub fn connect(socket_path: &str, command_timeout: Duration, poll_interval: Duration) -> Result<Self> {
    let writer = UnixStream::connect(socket_path).map_err(|e| Error::Connect {
      path: socket_path.to_string(),
      cause: e.to_string(),
    })?;
    let reader_stream = writer.try_clone().map_err(|e| Error::Connect {
      path: socket_path.to_string(),
      cause: e.to_string(),
    })?;

    let pending = Arc::new((Mutex::new(HashMap::new()), Condvar::new()));
    let reader_pending = Arc::clone(&pending);
    std::thread::spawn(move || Self::reader_loop(reader_stream, reader_pending));

    Ok(Self {
      writer,
      next_id: 1,
      tx_id: None,
      command_timeout,
      poll_interval,
      pending,
    })
  }

  fn reader_loop(stream: UnixStream, pending: Arc<(Mutex<Pending>, Condvar)>) {
    let mut lines = BufReader::new(stream).lines();
    while let Some(Ok(line)) = lines.next() {
      let value: serde_json::Value = match serde_json::from_str(&line) {
        Ok(v) => v,
        Err(e) => {
          warn!("malformed proxy response: {e}");
          continue;
        }
      };
      let Some(id) = value.get("id").and_then(|v| v.as_u64()) else {
        continue;
      };
      let (lock, cvar) = &*pending;
      let mut map = lock.lock().expect("proxy response map poisoned");
      map.insert(id, value);
      cvar.notify_all();
    }
  }

  fn call<P: Serialize, R: DeserializeOwned>(&mut self, method: Method, params: P) -> Result<R> {
    let id = self.next_id;
    self.next_id += 1;

    let request = Request {
      id,
      method,
      tx_id: self.tx_id,
      params,
    };
    let mut line = serde_json::to_string(&request)?;
    line.push('\n');
    self.writer.write_all(line.as_bytes()).map_err(|e| Error::Connect {
      path: "proxy".to_string(),
      cause: e.to_string(),
    })?;

    let (lock, cvar) = &*self.pending;
    let deadline = Instant::now() + self.command_timeout;
    let mut map = lock.lock().expect("proxy response map poisoned");
    loop {
      if let Some(value) = map.remove(&id) {
        if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
          let message = error.get("message").and_then(|m| m.as_str()).unwrap_or("proxy error");
          return Err(Error::Sql {
            sql: "<proxied>".to_string(),
            cause: message.to_string(),
          });
        }
        let result = value.get("result").cloned().unwrap_or(serde_json::Value::Null);
        return Ok(serde_json::from_value(result)?);
      }
      let now = Instant::now();
      if now >= deadline {
        return Err(Error::CommandTimeout(self.command_timeout));
      }
      let wait = self.poll_interval.min(deadline - now);
      let (guard, _) = cvar.wait_timeout(map, wait).expect("proxy response map poisoned");
      map = guard;
    }
  }
}

impl Driver for ProxyDriver {
  fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let result: ExecuteResult = self.call(
      Method::Execute,
      ExecuteParams {
        sql: sql.to_string(),
        params: params.to_vec(),
      },
    )?;
    Ok(result.rows_affected)
  }

  fn fetch_one(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>> {
    let result: FetchOneResult = self.call(
      Method::FetchOne,
      FetchOneParams {
        sql: sql.to_string(),
        params: params.to_vec(),
      },
    )?;
    Ok(result.row)
  }

  fn fetch_all(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
    let result: FetchAllResult = self.call(
      Method::FetchAll,
      FetchAllParams {
        sql: sql.to_string(),
        params: params.to_vec(),
      },
    )?;
    Ok(result.rows)
  }

  fn last_insert_rowid(&mut self) -> Result<i64> {
    let result: LastInsertRowidResult = self.call(Method::LastInsertRowid, LastInsertRowidParams {})?;
    Ok(result.rowid)
  }

  fn begin_transaction(&mut self) -> Result<()> {
    if self.tx_id.is_some() {
      return Err(Error::TransactionAlreadyActive);
    }
    let result: codestore_ipc::BeginTransactionResult = self.call(Method::BeginTransaction, BeginTransactionParams {})?;
    self.tx_id = Some(result.tx_id);
    Ok(())
  }

  fn commit_transaction(&mut self) -> Result<()> {
    if self.tx_id.is_none() {
      return Err(Error::NoActiveTransaction);
    }
    let _: codestore_ipc::CommitTransactionResult = self.call(Method::CommitTransaction, CommitTransactionParams {})?;
    self.tx_id = None;
    Ok(())
  }

  fn rollback_transaction(&mut self) -> Result<()> {
    if self.tx_id.is_none() {
      return Err(Error::NoActiveTransaction);
    }
    let _: codestore_ipc::RollbackTransactionResult =
      self.call(Method::RollbackTransaction, RollbackTransactionParams {})?;
    self.tx_id = None;
    Ok(())
  }

  fn in_transaction(&self) -> bool {
    self.tx_id.is_some()
  }

  fn table_info(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
    let result: TableInfoResult = self.call(
      Method::TableInfo,
      TableInfoParams {
        table: table.to_string(),
      },
    )?;
    Ok(result.columns.into_iter().map(ColumnInfo::from).collect())
  }

  fn is_thread_safe(&self) -> bool {
    true
  }
}
