use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpcError {
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("rpc error {code}: {message}")]
  Rpc { code: i32, message: String },

  #[error("no result in response")]
  NoResult,

  #[error("connection error: {0}")]
  Connection(String),

  #[error("command timed out")]
  Timeout,
}
