use codestore_core::SqlValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingParams {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteParams {
  pub sql: String,
  #[serde(default)]
  pub params: Vec<SqlValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOneParams {
  pub sql: String,
  #[serde(default)]
  pub params: Vec<SqlValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchAllParams {
  pub sql: String,
  #[serde(default)]
  pub params: Vec<SqlValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastInsertRowidParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeginTransactionParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitTransactionParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollbackTransactionParams {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfoParams {
  pub table: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSchemaParams {}
