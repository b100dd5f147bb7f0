use codestore_core::{ProjectId, WorkerConfig};
use codestore_index::VectorizationWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{error, info};

/// Drives the vectorization worker loop on `WorkerConfig.poll_interval`,
/// grounded on the teacher's `Scheduler` (broadcast-channel shutdown,
/// `tokio::select!` over a timer and the shutdown signal) but scoped to the
/// one background task spec §4.7 actually calls for.
pub struct Scheduler {
  project_id: ProjectId,
  worker: Arc<VectorizationWorker>,
  config: WorkerConfig,
  shutdown_rx: broadcast::Receiver<()>,
}

impl Scheduler {
  pub fn new(project_id: ProjectId, worker: Arc<VectorizationWorker>, config: WorkerConfig, shutdown_rx: broadcast::Receiver<()>) -> Self {
    Self {
      project_id,
      worker,
      config,
      shutdown_rx,
    }
  }

  pub async fn run(mut self) {
    let mut timer = interval(Duration::from_secs_f64(self.config.poll_interval));
    timer.tick().await; // first tick fires immediately; skip so the loop starts on the configured cadence

    loop {
      tokio::select! {
        _ = timer.tick() => {
          let started_at = current_unix_time();
          match self.worker.run_cycle(self.project_id, None, started_at).await {
            Ok(summary) => info!(?summary, "vectorization cycle finished"),
            Err(e) => error!(error = %e, "vectorization cycle failed"),
          }
        }
        _ = self.shutdown_rx.recv() => {
          info!("scheduler received shutdown signal, exiting");
          break;
        }
      }
    }
  }
}

fn current_unix_time() -> f64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .unwrap_or_default()
    .as_secs_f64()
}
