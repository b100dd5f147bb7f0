use codestore_core::{ColumnInfo, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResult {
  pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResult {
  pub rows_affected: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOneResult {
  pub row: Option<Row>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchAllResult {
  pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastInsertRowidResult {
  pub rowid: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeginTransactionResult {
  pub tx_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTransactionResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackTransactionResult {}

/// Serializable mirror of `codestore_core::ColumnInfo`, which does not
/// derive `Serialize`/`Deserialize` since it only ever needs to cross the
/// in-process driver boundary directly; the proxy driver uses this type to
/// cross the wire instead and converts on receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfoResult {
  pub columns: Vec<TableColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
  pub name: String,
  pub ty: String,
  pub not_null: bool,
  pub default: Option<String>,
  pub primary_key: bool,
}

impl From<ColumnInfo> for TableColumn {
  fn from(c: ColumnInfo) -> Self {
    Self {
      name: c.name,
      ty: c.ty,
      not_null: c.not_null,
      default: c.default,
      primary_key: c.primary_key,
    }
  }
}

impl From<TableColumn> for ColumnInfo {
  fn from(c: TableColumn) -> Self {
    Self {
      name: c.name,
      ty: c.ty,
      not_null: c.not_null,
      default: c.default,
      primary_key: c.primary_key,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSchemaResult {
  pub success: bool,
  pub changes_applied: Vec<String>,
  pub error: Option<String>,
}
