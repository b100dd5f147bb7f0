use codestore_core::{Error, Result};
use rusqlite::backup::Backup;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

/// Copies the live database file aside before a destructive schema
/// migration, using `rusqlite`'s online backup API rather than a plain
/// file copy, so a backup never races an in-flight write.
pub struct BackupManager {
  backup_dir: PathBuf,
}

impl BackupManager {
  pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
    Self {
      backup_dir: backup_dir.into(),
    }
  }

  /// Skips the backup entirely when the database has no tables yet; there
  /// is nothing destructive to protect against on a fresh file.
  pub fn backup_if_nonempty(&self, conn: &Connection, stem: &str) -> Result<Option<Uuid>> {
    let table_count: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
      )
      .map_err(|e| Error::SchemaSync(format!("failed to inspect database before backup: {e}")))?;

    if table_count == 0 {
      return Ok(None);
    }

    std::fs::create_dir_all(&self.backup_dir)?;

    let id = Uuid::new_v4();
    let timestamp = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or(0);
    let file_name = format!("{stem}-{timestamp}-{id}.db");
    let dest_path = self.backup_dir.join(&file_name);

    let mut dest = Connection::open(&dest_path).map_err(|e| Error::SchemaSync(format!("failed to create backup: {e}")))?;
    {
      let backup = Backup::new(conn, &mut dest).map_err(|e| Error::SchemaSync(format!("failed to start backup: {e}")))?;
      backup
        .run_to_completion(5, std::time::Duration::from_millis(10), None)
        .map_err(|e| Error::SchemaSync(format!("backup failed: {e}")))?;
    }

    info!(path = %dest_path.display(), "created pre-migration backup");
    Ok(Some(id))
  }

  pub fn backup_path(&self) -> &Path {
    &self.backup_dir
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn skips_backup_for_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let conn = Connection::open_in_memory().unwrap();
    let manager = BackupManager::new(dir.path().join("backups"));
    let result = manager.backup_if_nonempty(&conn, "database").unwrap();
    assert!(result.is_none());
  }

  #[test]
  fn backs_up_nonempty_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("live.db");
    let conn = Connection::open(&db_path).unwrap();
    conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", []).unwrap();
    conn.execute("INSERT INTO t DEFAULT VALUES", []).unwrap();

    let backup_dir = dir.path().join("backups");
    let manager = BackupManager::new(&backup_dir);
    let result = manager.backup_if_nonempty(&conn, "database").unwrap();
    assert!(result.is_some());

    let entries: Vec<_> = std::fs::read_dir(&backup_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
  }
}
