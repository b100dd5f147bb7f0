use serde::{Deserialize, Serialize};

/// Every command a `ProxyDriver` can send to the worker process that owns
/// the database file (spec §4.1, §6). One-to-one with `db::Driver`'s
/// methods, plus `SyncSchema` and `Ping` which only the proxy/daemon side
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
  Ping,
  Execute,
  FetchOne,
  FetchAll,
  LastInsertRowid,
  BeginTransaction,
  CommitTransaction,
  RollbackTransaction,
  TableInfo,
  SyncSchema,
}
