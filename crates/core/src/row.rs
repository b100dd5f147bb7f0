use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single column value as it crosses a driver boundary (direct or proxied).
///
/// Mirrors SQLite's storage classes: every driver, in-process or over IPC,
/// speaks in terms of these four variants plus NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl SqlValue {
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      SqlValue::Integer(v) => Some(*v),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      SqlValue::Real(v) => Some(*v),
      SqlValue::Integer(v) => Some(*v as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      SqlValue::Text(v) => Some(v),
      _ => None,
    }
  }

  pub fn as_blob(&self) -> Option<&[u8]> {
    match self {
      SqlValue::Blob(v) => Some(v),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, SqlValue::Null)
  }
}

impl From<i64> for SqlValue {
  fn from(v: i64) -> Self {
    SqlValue::Integer(v)
  }
}

impl From<f64> for SqlValue {
  fn from(v: f64) -> Self {
    SqlValue::Real(v)
  }
}

impl From<String> for SqlValue {
  fn from(v: String) -> Self {
    SqlValue::Text(v)
  }
}

impl From<bool> for SqlValue {
  fn from(v: bool) -> Self {
    SqlValue::Integer(v as i64)
  }
}

impl<T> From<Option<T>> for SqlValue
where
  SqlValue: From<T>,
{
  fn from(v: Option<T>) -> Self {
    match v {
      Some(v) => SqlValue::from(v),
      None => SqlValue::Null,
    }
  }
}

/// A fetched row, keyed by column name. Used by both the in-process and
/// proxy drivers so the persistence facade never depends on a concrete
/// driver's native row type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row(pub BTreeMap<String, SqlValue>);

impl Row {
  pub fn get(&self, column: &str) -> Option<&SqlValue> {
    self.0.get(column)
  }

  pub fn get_i64(&self, column: &str) -> Option<i64> {
    self.get(column).and_then(SqlValue::as_i64)
  }

  pub fn get_f64(&self, column: &str) -> Option<f64> {
    self.get(column).and_then(SqlValue::as_f64)
  }

  pub fn get_str(&self, column: &str) -> Option<&str> {
    self.get(column).and_then(SqlValue::as_str)
  }

  pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
    self.0.insert(column.into(), value.into());
  }
}
