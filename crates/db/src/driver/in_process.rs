use super::{Driver, TransactionState};
use codestore_core::{ColumnInfo, Error, Result, Row, SqlValue};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use rusqlite::types::{Value as RusqliteValue, ValueRef};
use std::path::Path;
use tracing::debug;

/// Direct SQLite access via `rusqlite`, grounded on the PRAGMA setup in
/// `ConaryLabs-conary`'s `db::init`/`db::open` and the open-then-setup-schema
/// shape of `rustadex-bookdb`'s `Database::create_or_open`.
///
/// Not `Sync`: `rusqlite::Connection` holds a raw SQLite handle that must
/// only be touched from one thread at a time. The facade is responsible for
/// serializing access with its own mutex when this driver is in use.
pub struct RusqliteDriver {
  conn: Connection,
  state: TransactionState,
  next_tx_id: u64,
}

impl RusqliteDriver {
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let conn = Connection::open(path).map_err(|e| Error::Connect {
      path: path.display().to_string(),
      cause: e.to_string(),
    })?;

    conn.execute_batch(
      "
      PRAGMA journal_mode = WAL;
      PRAGMA synchronous = NORMAL;
      PRAGMA foreign_keys = ON;
      PRAGMA busy_timeout = 5000;
      ",
    )
    .map_err(|e| Error::Connect {
      path: path.display().to_string(),
      cause: e.to_string(),
    })?;

    debug!(path = %path.display(), "opened sqlite database");

    Ok(Self {
      conn,
      state: TransactionState::Idle,
      next_tx_id: 1,
    })
  }

  pub fn in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().map_err(|e| Error::Connect {
      path: ":memory:".to_string(),
      cause: e.to_string(),
    })?;
    conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(|e| Error::Connect {
      path: ":memory:".to_string(),
      cause: e.to_string(),
    })?;
    Ok(Self {
      conn,
      state: TransactionState::Idle,
      next_tx_id: 1,
    })
  }

  pub fn connection(&self) -> &Connection {
    &self.conn
  }

  pub fn connection_mut(&mut self) -> &mut Connection {
    &mut self.conn
  }

  fn sql_err(sql: &str, cause: rusqlite::Error) -> Error {
    if matches!(cause, rusqlite::Error::SqliteFailure(ref e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation) {
      Error::ConstraintViolation(cause.to_string())
    } else {
      Error::Sql {
        sql: Error::redacted_sql(sql),
        cause: cause.to_string(),
      }
    }
  }
}

fn to_rusqlite_value(v: &SqlValue) -> RusqliteValue {
  match v {
    SqlValue::Null => RusqliteValue::Null,
    SqlValue::Integer(i) => RusqliteValue::Integer(*i),
    SqlValue::Real(f) => RusqliteValue::Real(*f),
    SqlValue::Text(s) => RusqliteValue::Text(s.clone()),
    SqlValue::Blob(b) => RusqliteValue::Blob(b.clone()),
  }
}

fn from_value_ref(v: ValueRef<'_>) -> SqlValue {
  match v {
    ValueRef::Null => SqlValue::Null,
    ValueRef::Integer(i) => SqlValue::Integer(i),
    ValueRef::Real(f) => SqlValue::Real(f),
    ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
  }
}

fn row_to_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
  let mut out = Row::default();
  for i in 0..row.as_ref().column_count() {
    let name = row.as_ref().column_name(i)?.to_string();
    let value = from_value_ref(row.get_ref(i)?);
    out.0.insert(name, value);
  }
  Ok(out)
}

impl Driver for RusqliteDriver {
  fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let values: Vec<RusqliteValue> = params.iter().map(to_rusqlite_value).collect();
    self
      .conn
      .execute(sql, params_from_iter(values))
      .map(|n| n as u64)
      .map_err(|e| Self::sql_err(sql, e))
  }

  fn fetch_one(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>> {
    let values: Vec<RusqliteValue> = params.iter().map(to_rusqlite_value).collect();
    let mut stmt = self.conn.prepare(sql).map_err(|e| Self::sql_err(sql, e))?;
    stmt
      .query_row(params_from_iter(values), row_to_row)
      .optional()
      .map_err(|e| Self::sql_err(sql, e))
  }

  fn fetch_all(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
    let values: Vec<RusqliteValue> = params.iter().map(to_rusqlite_value).collect();
    let mut stmt = self.conn.prepare(sql).map_err(|e| Self::sql_err(sql, e))?;
    let rows = stmt
      .query_map(params_from_iter(values), row_to_row)
      .map_err(|e| Self::sql_err(sql, e))?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(|e| Self::sql_err(sql, e))
  }

  fn last_insert_rowid(&mut self) -> Result<i64> {
    Ok(self.conn.last_insert_rowid())
  }

  fn begin_transaction(&mut self) -> Result<()> {
    if matches!(self.state, TransactionState::Active(_)) {
      return Err(Error::TransactionAlreadyActive);
    }
    self
      .conn
      .execute_batch("BEGIN")
      .map_err(|e| Self::sql_err("BEGIN", e))?;
    self.state = TransactionState::Active(self.next_tx_id);
    self.next_tx_id += 1;
    Ok(())
  }

  fn commit_transaction(&mut self) -> Result<()> {
    if !matches!(self.state, TransactionState::Active(_)) {
      return Err(Error::NoActiveTransaction);
    }
    self
      .conn
      .execute_batch("COMMIT")
      .map_err(|e| Self::sql_err("COMMIT", e))?;
    self.state = TransactionState::Idle;
    Ok(())
  }

  fn rollback_transaction(&mut self) -> Result<()> {
    if !matches!(self.state, TransactionState::Active(_)) {
      return Err(Error::NoActiveTransaction);
    }
    self
      .conn
      .execute_batch("ROLLBACK")
      .map_err(|e| Self::sql_err("ROLLBACK", e))?;
    self.state = TransactionState::Idle;
    Ok(())
  }

  fn in_transaction(&self) -> bool {
    matches!(self.state, TransactionState::Active(_))
  }

  fn table_info(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
    let sql = format!("PRAGMA table_info({table})");
    let mut stmt = self.conn.prepare(&sql).map_err(|e| Self::sql_err(&sql, e))?;
    let rows = stmt
      .query_map([], |row| {
        Ok(ColumnInfo {
          name: row.get(1)?,
          ty: row.get(2)?,
          not_null: row.get::<_, i64>(3)? != 0,
          default: row.get(4)?,
          primary_key: row.get::<_, i64>(5)? != 0,
        })
      })
      .map_err(|e| Self::sql_err(&sql, e))?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(|e| Self::sql_err(&sql, e))
  }

  fn is_thread_safe(&self) -> bool {
    false
  }

  fn raw_connection(&self) -> Option<&rusqlite::Connection> {
    Some(&self.conn)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn executes_and_fetches() {
    let mut driver = RusqliteDriver::in_memory().unwrap();
    driver.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[]).unwrap();
    driver
      .execute("INSERT INTO t (name) VALUES (?1)", &[SqlValue::Text("alice".into())])
      .unwrap();
    let id = driver.last_insert_rowid().unwrap();
    assert_eq!(id, 1);

    let row = driver
      .fetch_one("SELECT name FROM t WHERE id = ?1", &[SqlValue::Integer(id)])
      .unwrap()
      .unwrap();
    assert_eq!(row.get_str("name"), Some("alice"));
  }

  #[test]
  fn transaction_state_machine_rejects_double_begin() {
    let mut driver = RusqliteDriver::in_memory().unwrap();
    driver.begin_transaction().unwrap();
    assert!(driver.in_transaction());
    assert!(matches!(driver.begin_transaction(), Err(Error::TransactionAlreadyActive)));
    driver.commit_transaction().unwrap();
    assert!(!driver.in_transaction());
  }

  #[test]
  fn rollback_undoes_writes() {
    let mut driver = RusqliteDriver::in_memory().unwrap();
    driver.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[]).unwrap();
    driver.begin_transaction().unwrap();
    driver.execute("INSERT INTO t DEFAULT VALUES", &[]).unwrap();
    driver.rollback_transaction().unwrap();
    let rows = driver.fetch_all("SELECT id FROM t", &[]).unwrap();
    assert!(rows.is_empty());
  }

  #[test]
  fn table_info_reports_columns() {
    let mut driver = RusqliteDriver::in_memory().unwrap();
    driver
      .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL)", &[])
      .unwrap();
    let info = driver.table_info("t").unwrap();
    assert_eq!(info.len(), 2);
    assert_eq!(info[0].name, "id");
    assert!(info[0].primary_key);
    assert!(info[1].not_null);
  }
}
