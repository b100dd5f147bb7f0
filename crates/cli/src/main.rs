//! CLI entry point: start the worker process, trigger a schema sync, or
//! print a project's stats. Scoped down from the teacher's much larger
//! `cli::main` subcommand set to the operations this engine actually
//! exposes (spec §6).

mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use codestore_daemon::{DbWorker, Listener, Scheduler};
use codestore_db::Store;
use codestore_embedding::{Embedder, HttpEmbedder, LocalEmbedder};
use codestore_index::{InMemorySimilarityIndex, VectorizationLimits, VectorizationWorker, WhitespaceChunker};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "codestore", version, about = "Code analysis storage and indexing engine")]
struct Cli {
  /// Path to the project's config file.
  #[arg(long, global = true, default_value = "codestore.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Runs the worker process: owns the database file, serves the proxy
  /// socket, and drives the vectorization loop on a schedule.
  Run {
    /// Root directory of the project to track.
    project_root: PathBuf,
    /// Unix socket path `ProxyDriver` clients connect to.
    #[arg(long, default_value = "/tmp/codestore.sock")]
    socket: PathBuf,
    /// Stay attached to the terminal instead of logging to a rotating file.
    #[arg(long)]
    foreground: bool,
    #[arg(long, default_value = "/tmp/codestore-logs")]
    log_dir: PathBuf,
    /// Use the deterministic local embedder instead of the configured HTTP one.
    #[arg(long)]
    local_embedder: bool,
  },
  /// Reconciles the database schema against `config.driver` and exits.
  SyncSchema,
  /// Prints the latest file-watcher and vectorization stats for a project.
  Stats {
    project_root: PathBuf,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Run {
      project_root,
      socket,
      foreground,
      log_dir,
      local_embedder,
    } => run_daemon(&cli.config, project_root, socket, foreground, log_dir, local_embedder).await,
    Commands::SyncSchema => {
      logging::init_cli_logging();
      sync_schema(&cli.config)
    }
    Commands::Stats { project_root } => {
      logging::init_cli_logging();
      print_stats(&cli.config, project_root)
    }
  }
}

async fn run_daemon(
  config_path: &PathBuf,
  project_root: PathBuf,
  socket: PathBuf,
  foreground: bool,
  log_dir: PathBuf,
  local_embedder: bool,
) -> Result<()> {
  let _guard = logging::init_daemon_logging(foreground, &log_dir);
  let config = config::load_config(config_path)?;

  if config.driver.is_proxy() {
    bail!("the daemon requires an in-process driver config; a proxy config is for clients connecting to it");
  }

  let worker = Arc::new(DbWorker::open(&config.driver).context("opening database")?);
  let sync = worker.sync_schema();
  if !sync.success {
    bail!("schema sync failed: {}", sync.error.unwrap_or_default());
  }
  tracing::info!(changes = sync.changes_applied.len(), "schema synced");

  let store = Arc::new(Store::connect(&config.driver).context("connecting to database")?);
  let project_root_str = project_root.to_string_lossy().to_string();
  let project = find_or_create_project(&store, &project_root_str)?;

  let embedder: Arc<dyn Embedder> = if local_embedder {
    Arc::new(LocalEmbedder::new(config.embedding.dimension))
  } else {
    Arc::new(HttpEmbedder::new(&config.embedding))
  };

  let vectorization_worker = Arc::new(VectorizationWorker::new(
    Arc::clone(&store),
    Arc::new(WhitespaceChunker::default()),
    embedder,
    Arc::new(InMemorySimilarityIndex::default()),
    VectorizationLimits::default(),
  ));

  let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
  let scheduler = Scheduler::new(project.id, vectorization_worker, config.worker.clone(), shutdown_rx);
  let scheduler_handle = tokio::spawn(scheduler.run());

  let socket_path = socket.to_string_lossy().to_string();
  let listener = Listener::new(socket_path.clone(), Arc::clone(&worker));
  let listener_handle = tokio::task::spawn_blocking(move || listener.serve());

  tracing::info!(socket = %socket_path, project = %project.name, "codestore daemon running");

  tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
  tracing::info!("shutdown requested");
  let _ = shutdown_tx.send(());

  if let Err(e) = scheduler_handle.await {
    tracing::error!(error = %e, "scheduler task panicked");
  }
  // The listener's accept loop only returns on a socket error; a clean
  // shutdown just lets the process exit without waiting on it.
  listener_handle.abort();

  Ok(())
}

fn sync_schema(config_path: &PathBuf) -> Result<()> {
  let config = config::load_config(config_path)?;
  let store = Store::connect(&config.driver).context("connecting to database")?;
  let result = store.sync_schema()?;
  if !result.success {
    bail!("schema sync failed: {}", result.error.unwrap_or_default());
  }
  println!("schema synced, {} change(s) applied", result.changes_applied.len());
  Ok(())
}

fn print_stats(config_path: &PathBuf, project_root: PathBuf) -> Result<()> {
  let config = config::load_config(config_path)?;
  let store = Store::connect(&config.driver).context("connecting to database")?;
  let project_root_str = project_root.to_string_lossy().to_string();

  let project = store
    .list_projects()?
    .into_iter()
    .find(|p| p.root_path == project_root_str)
    .with_context(|| format!("no project tracked at {project_root_str}"))?;

  println!("project: {} ({})", project.name, project.id);
  Ok(())
}

/// Finds the project row for `root_path`, creating one named after the
/// directory's basename if this is the first time the daemon has seen it.
fn find_or_create_project(store: &Store, root_path: &str) -> Result<codestore_core::Project> {
  if let Some(project) = store.list_projects()?.into_iter().find(|p| p.root_path == root_path) {
    return Ok(project);
  }

  let name = PathBuf::from(root_path)
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| root_path.to_string());

  store.create_project(root_path, &name, None, None).context("creating project")
}
