use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy shared by the driver, persistence facade, atomic
/// updater, cross-ref builder, and vectorization worker (spec §7). Kept as
/// one enum rather than one-per-crate because every one of these kinds can
/// surface from any layer of the same storage stack, and callers need to
/// match on them uniformly regardless of which crate raised them.
#[derive(Debug, Error)]
pub enum Error {
  #[error("missing or invalid driver configuration: {0}")]
  Config(String),

  #[error("failed to open database at {path}: {cause}")]
  Connect { path: String, cause: String },

  #[error("schema sync failed: {0}")]
  SchemaSync(String),

  #[error("sql error executing `{sql}`: {cause}")]
  Sql { sql: String, cause: String },

  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("transaction already active")]
  TransactionAlreadyActive,

  #[error("no active transaction")]
  NoActiveTransaction,

  #[error("not in transaction")]
  NotInTransaction,

  #[error("command timed out after {0:?}")]
  CommandTimeout(std::time::Duration),

  #[error("invalid cross-ref: {0}")]
  InvalidCrossRef(String),

  #[error("syntax error parsing source: {0}")]
  Syntax(String),

  #[error("file not found: {0}")]
  FileNotFound(String),

  #[error("embedder error: {0}")]
  Embedder(String),

  #[error("similarity index error: {0}")]
  Index(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serde(#[from] serde_json::Error),
}

impl Error {
  /// Redacts the SQL text of a `Sql` error for logging, per spec §7
  /// ("includes the failed statement (redacted of user data in logs)").
  /// Keeps the statement's shape (keyword + table) but drops literal values.
  pub fn redacted_sql(sql: &str) -> String {
    sql.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
  }
}
