//! Wire envelope for the proxy driver: a `Store` running in one process
//! forwards every database command to a worker process that exclusively
//! owns the SQLite file, and reads back the response over the same
//! transport. Shape (request/response/method/error) is grounded on
//! `JoeyEamigh-ccmemory`'s `ipc` crate; the command set itself is this
//! engine's own (spec §6).

mod error;
mod method;
mod protocol;
mod request;
mod response;

pub use error::IpcError;
pub use method::Method;
pub use protocol::{Request, Response, RpcError};
pub use request::*;
pub use response::*;
