use super::Store;
use codestore_core::{CycleId, FileWatcherStats, ProjectId, Result, Row, SqlValue, VectorizationStats};

impl Store {
  /// Opens a new file-watcher cycle row, returning the id the caller
  /// threads through `finish_file_watcher_cycle` once the scan completes
  /// (spec §3 `FileWatcherStats`, keyed by UUID cycle id).
  pub fn start_file_watcher_cycle(&self, project_id: ProjectId, started_at: f64) -> Result<CycleId> {
    let cycle_id = CycleId::new();
    self.execute(
      "INSERT INTO file_watcher_stats (cycle_id, project_id, started_at) VALUES (?1, ?2, ?3)",
      &[
        SqlValue::Text(cycle_id.to_string()),
        SqlValue::Text(project_id.to_string()),
        SqlValue::Real(started_at),
      ],
    )?;
    Ok(cycle_id)
  }

  pub fn finish_file_watcher_cycle(&self, cycle_id: CycleId, scanned: i64, changed: i64, deleted: i64, finished_at: f64) -> Result<()> {
    self.execute(
      "UPDATE file_watcher_stats SET files_scanned = ?2, files_changed = ?3, files_deleted = ?4, finished_at = ?5 WHERE cycle_id = ?1",
      &[
        SqlValue::Text(cycle_id.to_string()),
        SqlValue::Integer(scanned),
        SqlValue::Integer(changed),
        SqlValue::Integer(deleted),
        SqlValue::Real(finished_at),
      ],
    )?;
    Ok(())
  }

  pub fn file_watcher_stats_for_cycle(&self, cycle_id: CycleId) -> Result<Option<FileWatcherStats>> {
    let row = self.fetch_one(
      "SELECT * FROM file_watcher_stats WHERE cycle_id = ?1",
      &[SqlValue::Text(cycle_id.to_string())],
    )?;
    row.map(row_to_watcher_stats).transpose()
  }

  /// Opens a new vectorization cycle row (spec §4.7 step 5). The worker
  /// calls this once per loop iteration and updates the same row as it
  /// embeds and registers chunks.
  pub fn start_vectorization_cycle(&self, project_id: ProjectId, started_at: f64) -> Result<CycleId> {
    let cycle_id = CycleId::new();
    self.execute(
      "INSERT INTO vectorization_stats (cycle_id, project_id, started_at) VALUES (?1, ?2, ?3)",
      &[
        SqlValue::Text(cycle_id.to_string()),
        SqlValue::Text(project_id.to_string()),
        SqlValue::Real(started_at),
      ],
    )?;
    Ok(cycle_id)
  }

  pub fn record_vectorization_progress(&self, cycle_id: CycleId, embedded: i64, registered: i64, embedder_failures: i64, index_failures: i64) -> Result<()> {
    self.execute(
      "UPDATE vectorization_stats
         SET chunks_embedded = chunks_embedded + ?2,
             chunks_registered = chunks_registered + ?3,
             embedder_failures = embedder_failures + ?4,
             index_failures = index_failures + ?5
       WHERE cycle_id = ?1",
      &[
        SqlValue::Text(cycle_id.to_string()),
        SqlValue::Integer(embedded),
        SqlValue::Integer(registered),
        SqlValue::Integer(embedder_failures),
        SqlValue::Integer(index_failures),
      ],
    )?;
    Ok(())
  }

  pub fn finish_vectorization_cycle(&self, cycle_id: CycleId, finished_at: f64) -> Result<()> {
    self.execute(
      "UPDATE vectorization_stats SET finished_at = ?2 WHERE cycle_id = ?1",
      &[SqlValue::Text(cycle_id.to_string()), SqlValue::Real(finished_at)],
    )?;
    Ok(())
  }

  pub fn vectorization_stats_for_cycle(&self, cycle_id: CycleId) -> Result<Option<VectorizationStats>> {
    let row = self.fetch_one(
      "SELECT * FROM vectorization_stats WHERE cycle_id = ?1",
      &[SqlValue::Text(cycle_id.to_string())],
    )?;
    row.map(row_to_vectorization_stats).transpose()
  }
}

fn parse_uuid_field<T: std::str::FromStr>(row: &Row, column: &str) -> Result<T> {
  row
    .get_str(column)
    .unwrap_or_default()
    .parse()
    .map_err(|_| codestore_core::Error::InvalidCrossRef(format!("malformed {column}")))
}

fn row_to_watcher_stats(row: Row) -> Result<FileWatcherStats> {
  Ok(FileWatcherStats {
    cycle_id: parse_uuid_field(&row, "cycle_id")?,
    project_id: parse_uuid_field(&row, "project_id")?,
    files_scanned: row.get_i64("files_scanned").unwrap_or(0),
    files_changed: row.get_i64("files_changed").unwrap_or(0),
    files_deleted: row.get_i64("files_deleted").unwrap_or(0),
    started_at: row.get_f64("started_at").unwrap_or(0.0),
    finished_at: row.get_f64("finished_at"),
  })
}

fn row_to_vectorization_stats(row: Row) -> Result<VectorizationStats> {
  Ok(VectorizationStats {
    cycle_id: parse_uuid_field(&row, "cycle_id")?,
    project_id: parse_uuid_field(&row, "project_id")?,
    chunks_embedded: row.get_i64("chunks_embedded").unwrap_or(0),
    chunks_registered: row.get_i64("chunks_registered").unwrap_or(0),
    embedder_failures: row.get_i64("embedder_failures").unwrap_or(0),
    index_failures: row.get_i64("index_failures").unwrap_or(0),
    started_at: row.get_f64("started_at").unwrap_or(0.0),
    finished_at: row.get_f64("finished_at"),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn records_a_vectorization_cycle() {
    let store = Store::connect_in_memory().unwrap();
    let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
    let cycle = store.start_vectorization_cycle(project.id, 100.0).unwrap();
    store.record_vectorization_progress(cycle, 3, 2, 1, 0).unwrap();
    store.finish_vectorization_cycle(cycle, 101.0).unwrap();

    let stats = store.vectorization_stats_for_cycle(cycle).unwrap().unwrap();
    assert_eq!(stats.chunks_embedded, 3);
    assert_eq!(stats.chunks_registered, 2);
    assert_eq!(stats.embedder_failures, 1);
    assert_eq!(stats.finished_at, Some(101.0));
  }

  #[test]
  fn records_a_file_watcher_cycle() {
    let store = Store::connect_in_memory().unwrap();
    let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
    let cycle = store.start_file_watcher_cycle(project.id, 10.0).unwrap();
    store.finish_file_watcher_cycle(cycle, 5, 2, 1, 11.0).unwrap();

    let stats = store.file_watcher_stats_for_cycle(cycle).unwrap().unwrap();
    assert_eq!(stats.files_scanned, 5);
    assert_eq!(stats.files_changed, 2);
    assert_eq!(stats.files_deleted, 1);
  }
}
