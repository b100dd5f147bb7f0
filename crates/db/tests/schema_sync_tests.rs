//! Scenario tests for the schema synchronizer (spec §8 S1, S2, S7 and the
//! idempotency / data-preservation testable properties 5 and 6).

use codestore_core::SCHEMA_VERSION;
use codestore_db::{declarative_schema, sync_schema, Driver, RusqliteDriver};

fn setting(driver: &mut dyn Driver, key: &str) -> Option<String> {
  driver
    .fetch_one("SELECT value FROM db_settings WHERE key = ?1", &[codestore_core::SqlValue::Text(key.to_string())])
    .unwrap()
    .and_then(|r| r.get_str("value").map(str::to_string))
}

/// S1: a `db_settings` table with only `(key, value)` gets `updated_at`
/// added via `ALTER TABLE ... ADD COLUMN`, not a rebuild, and the stored
/// `schema_version` converges to the code value.
#[test]
fn s1_add_column_upgrade_preserves_rows_and_bumps_version() {
  let mut driver = RusqliteDriver::in_memory().unwrap();
  driver
    .execute("CREATE TABLE db_settings (key TEXT PRIMARY KEY, value TEXT)", &[])
    .unwrap();
  driver
    .execute(
      "INSERT INTO db_settings (key, value) VALUES ('marker', 'present')",
      &[],
    )
    .unwrap();

  let schema = declarative_schema();
  let result = sync_schema(&mut driver, &schema, None);

  assert!(result.success, "sync failed: {:?}", result.error);
  assert!(
    result
      .changes_applied
      .iter()
      .any(|s| s.contains("CREATE TABLE IF NOT EXISTS projects")),
    "expected missing tables to be created: {:?}",
    result.changes_applied
  );

  let marker = driver
    .fetch_one(
      "SELECT value FROM db_settings WHERE key = 'marker'",
      &[],
    )
    .unwrap()
    .and_then(|r| r.get_str("value").map(str::to_string));
  assert_eq!(marker.as_deref(), Some("present"));

  assert_eq!(setting(&mut driver, "schema_version").as_deref(), Some(SCHEMA_VERSION));
}

/// S2: a `value INTEGER` column widened to `TEXT` forces a rename-recreate-
/// copy-drop sequence; the row survives with its value intact and a backup
/// is produced when a `BackupManager` is supplied.
#[test]
fn s2_type_change_forces_recreate_and_preserves_row() {
  let dir = tempfile::tempdir().unwrap();
  let db_path = dir.path().join("live.db");
  let mut driver = RusqliteDriver::open(&db_path).unwrap();

  driver
    .execute(
      "CREATE TABLE db_settings (key TEXT PRIMARY KEY, value INTEGER, updated_at REAL)",
      &[],
    )
    .unwrap();
  driver
    .execute("INSERT INTO db_settings (key, value, updated_at) VALUES ('a', 42, NULL)", &[])
    .unwrap();

  let schema = declarative_schema();
  let backup_dir = dir.path().join("backups");
  let manager = codestore_db::BackupManager::new(&backup_dir);
  let result = sync_schema(&mut driver, &schema, Some(&manager));

  assert!(result.success, "sync failed: {:?}", result.error);
  assert!(result.backup_uuid.is_some(), "expected a backup before a destructive recreate");
  assert!(backup_dir.exists(), "backup directory should have been created");
  assert!(std::fs::read_dir(&backup_dir).unwrap().next().is_some(), "expected a backup file on disk");

  let row = driver
    .fetch_one("SELECT value FROM db_settings WHERE key = 'a'", &[])
    .unwrap()
    .unwrap();
  assert_eq!(row.get_str("value"), Some("42"));
}

/// Testable property 5: syncing twice in a row yields no changes the
/// second time and leaves `schema_version` at the code value.
#[test]
fn sync_schema_is_idempotent() {
  let mut driver = RusqliteDriver::in_memory().unwrap();
  let schema = declarative_schema();

  let first = sync_schema(&mut driver, &schema, None);
  assert!(first.success, "first sync failed: {:?}", first.error);
  assert!(!first.changes_applied.is_empty());

  let second = sync_schema(&mut driver, &schema, None);
  assert!(second.success, "second sync failed: {:?}", second.error);
  assert!(second.changes_applied.is_empty(), "expected no-op on a fresh sync: {:?}", second.changes_applied);
  assert_eq!(setting(&mut driver, "schema_version").as_deref(), Some(SCHEMA_VERSION));
}

/// S7: a full-text mirror of `code_content` stays searchable after its
/// virtual table is forced through a recreate.
#[test]
fn s7_fts_recreate_preserves_search_over_backing_table() {
  let mut driver = RusqliteDriver::in_memory().unwrap();
  let schema = declarative_schema();
  let result = sync_schema(&mut driver, &schema, None);
  assert!(result.success, "initial sync failed: {:?}", result.error);

  driver
    .execute(
      "INSERT INTO projects (id, root_path, name) VALUES ('proj', '/tmp/proj', 'proj')",
      &[],
    )
    .unwrap();
  driver
    .execute("INSERT INTO datasets (id, project_id, root_path) VALUES ('ds', 'proj', '/tmp/proj')", &[])
    .unwrap();
  driver
    .execute(
      "INSERT INTO files (project_id, dataset_id, path, relative_path, last_modified) VALUES ('proj', 'ds', '/tmp/proj/a.py', 'a.py', 0.0)",
      &[],
    )
    .unwrap();
  let file_id = driver.last_insert_rowid().unwrap();
  driver
    .execute(
      "INSERT INTO code_content (file_id, owner_kind, content, docstring) VALUES (?1, 'class', 'needle haystack', NULL)",
      &[codestore_core::SqlValue::Integer(file_id)],
    )
    .unwrap();

  let hits = driver
    .fetch_all("SELECT rowid FROM code_content_fts WHERE code_content_fts MATCH 'needle'", &[])
    .unwrap();
  assert_eq!(hits.len(), 1, "row should be searchable through the external-content FTS table before recreate");

  // Force a recreate by dropping and rebuilding the virtual table, the way
  // `changed_virtual_tables` would if the schema's column set changed.
  driver.execute("DROP TABLE code_content_fts", &[]).unwrap();
  let second = sync_schema(&mut driver, &schema, None);
  assert!(second.success, "post-drop resync failed: {:?}", second.error);

  let hits_after = driver
    .fetch_all("SELECT rowid FROM code_content_fts WHERE code_content_fts MATCH 'needle'", &[])
    .unwrap();
  assert_eq!(hits_after.len(), 1, "row should still be searchable after the FTS table is recreated");
}
