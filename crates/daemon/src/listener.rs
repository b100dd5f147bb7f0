use crate::worker::DbWorker;
use codestore_ipc::{Request, Response};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Serves IPC commands over a Unix socket, one thread per connection; the
/// worker side of `ProxyDriver`'s blocking, newline-delimited-JSON
/// transport (spec §4.1/§6). `DbWorker` internally serializes every
/// command through its own mutex, so concurrent connections are safe.
pub struct Listener {
  socket_path: String,
  worker: Arc<DbWorker>,
}

impl Listener {
  pub fn new(socket_path: impl Into<String>, worker: Arc<DbWorker>) -> Self {
    Self {
      socket_path: socket_path.into(),
      worker,
    }
  }

  /// Binds the socket and serves connections until the process exits.
  /// Removes a stale socket file left over from an unclean shutdown before
  /// binding, matching the common Unix-socket-server idiom.
  pub fn serve(&self) -> std::io::Result<()> {
    let _ = std::fs::remove_file(&self.socket_path);
    let listener = UnixListener::bind(&self.socket_path)?;
    info!(path = %self.socket_path, "listening for proxy connections");

    for stream in listener.incoming() {
      match stream {
        Ok(stream) => {
          let worker = Arc::clone(&self.worker);
          std::thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &worker) {
              warn!(error = %e, "proxy connection ended with an error");
            }
          });
        }
        Err(e) => error!(error = %e, "failed to accept proxy connection"),
      }
    }
    Ok(())
  }
}

fn handle_connection(stream: UnixStream, worker: &DbWorker) -> std::io::Result<()> {
  let mut writer = stream.try_clone()?;
  let reader = BufReader::new(stream);

  for line in reader.lines() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }

    let request: Request<serde_json::Value> = match serde_json::from_str(&line) {
      Ok(req) => req,
      Err(e) => {
        warn!(error = %e, "malformed proxy request, dropping connection");
        break;
      }
    };

    let response = match worker.handle(request.method, request.params) {
      Ok(result) => Response::success(request.id, result),
      Err(e) => Response {
        id: request.id,
        result: None,
        error: Some(codestore_ipc::RpcError {
          code: 1,
          message: e.to_string(),
        }),
      },
    };

    let mut out = serde_json::to_string(&response).map_err(std::io::Error::other)?;
    out.push('\n');
    writer.write_all(out.as_bytes())?;
  }

  Ok(())
}
