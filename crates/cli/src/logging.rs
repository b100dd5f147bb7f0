//! Logging setup for CLI commands and the daemon they launch, grounded on
//! `JoeyEamigh-ccmemory`'s `cli::logging` (console-only for interactive
//! commands, rotating file output for a backgrounded daemon).

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes logging for interactive CLI commands: console only, level
/// from `RUST_LOG` defaulting to `info`.
pub fn init_cli_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
    .init();
}

/// Initializes logging for a foreground or backgrounded daemon run.
/// Foreground mode logs to the console with colors; background mode logs
/// to a daily-rotating file under `log_dir` with no ANSI codes. Returns the
/// guard that must be kept alive for the duration of the process when
/// background logging is used.
pub fn init_daemon_logging(foreground: bool, log_dir: &Path) -> Option<WorkerGuard> {
  let env_filter = EnvFilter::builder().with_default_directive(tracing::Level::INFO.into()).from_env_lossy();

  if foreground {
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).with_ansi(true).init();
    return None;
  }

  if std::fs::create_dir_all(log_dir).is_err() {
    init_cli_logging();
    return None;
  }

  let file_appender = tracing_appender::rolling::daily(log_dir, "codestore.log");
  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}
