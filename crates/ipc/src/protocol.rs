use crate::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request<P = serde_json::Value> {
  pub id: u64,
  pub method: Method,
  /// Set once a transaction is active on the worker's connection; absent
  /// for the stateless `Ping`/`SyncSchema` commands.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tx_id: Option<u64>,
  #[serde(default)]
  pub params: P,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response<R = serde_json::Value> {
  pub id: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<R>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
  pub code: i32,
  pub message: String,
}

impl<R> Response<R> {
  pub fn success(id: u64, result: R) -> Self {
    Self {
      id,
      result: Some(result),
      error: None,
    }
  }
}

impl Response<()> {
  pub fn error(id: u64, code: i32, message: impl Into<String>) -> Self {
    Self {
      id,
      result: None,
      error: Some(RpcError {
        code,
        message: message.into(),
      }),
    }
  }
}
