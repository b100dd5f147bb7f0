mod canonical;
mod comparator;
mod planner;

pub use canonical::declarative_schema;
pub use comparator::SchemaComparator;
pub use planner::{generate_create_index_sql, generate_create_table_sql, generate_recreate_table_sql, MigrationPlan, SchemaPlanner};

use crate::backup::BackupManager;
use crate::Driver;
use codestore_core::{Schema, SchemaSyncResult, SqlValue, SCHEMA_VERSION};
use tracing::{error, info};

/// Reconciles a live database against `schema`, taking a backup first if
/// the plan is destructive (spec §4.2/§4.3). Returns a result rather than
/// propagating `Error` so a facade can decide whether a sync failure should
/// make it permanently unusable (per `base.py`'s `__init__` contract) or be
/// retried.
pub fn sync_schema(driver: &mut dyn Driver, schema: &Schema, backup: Option<&BackupManager>) -> SchemaSyncResult {
  let diff = match SchemaComparator::new(driver).compare(schema) {
    Ok(diff) => diff,
    Err(e) => return SchemaSyncResult::failed(e.to_string()),
  };

  if !diff.has_changes() {
    if let Err(e) = write_schema_version(driver) {
      return SchemaSyncResult::failed(e.to_string());
    }
    return SchemaSyncResult::ok(Vec::new(), None);
  }

  let backup_uuid = if diff.is_destructive() {
    match (backup, driver.raw_connection()) {
      (Some(manager), Some(conn)) => match manager.backup_if_nonempty(conn, "database") {
        Ok(uuid) => uuid,
        Err(e) => {
          error!("pre-migration backup failed: {e}");
          return SchemaSyncResult::failed(format!("backup failed, migration aborted: {e}"));
        }
      },
      _ => None,
    }
  } else {
    None
  };

  let planner = SchemaPlanner::new(schema);
  let plan = planner.generate_migration_sql(&diff);

  if let Err(e) = driver.begin_transaction() {
    return SchemaSyncResult::failed(format!("could not start migration transaction: {e}"));
  }

  let mut applied = Vec::new();
  for statement in &plan {
    if let Err(e) = driver.execute(statement, &[]) {
      error!(statement, "schema migration statement failed: {e}");
      let _ = driver.rollback_transaction();
      return SchemaSyncResult {
        success: false,
        backup_uuid,
        changes_applied: Vec::new(),
        error: Some(format!("migration failed at `{}`: {e}", codestore_core::Error::redacted_sql(statement))),
      };
    }
    applied.push(statement.clone());
  }

  if let Err(e) = write_schema_version(driver) {
    let _ = driver.rollback_transaction();
    return SchemaSyncResult::failed(e.to_string());
  }

  if let Err(e) = driver.commit_transaction() {
    return SchemaSyncResult::failed(format!("could not commit migration transaction: {e}"));
  }

  info!(applied = applied.len(), "schema sync complete");
  SchemaSyncResult::ok(applied, backup_uuid)
}

/// Upserts `schema_version`, never regressing it (spec §3 invariant): a
/// stored value is only overwritten when it's below [`SCHEMA_VERSION`].
fn write_schema_version(driver: &mut dyn Driver) -> codestore_core::Result<()> {
  driver.execute(
    "INSERT INTO db_settings (key, value) VALUES ('schema_version', ?1)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value WHERE db_settings.value < excluded.value",
    &[SqlValue::Text(SCHEMA_VERSION.to_string())],
  )?;
  Ok(())
}
