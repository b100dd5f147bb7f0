use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Code-level schema version (spec §6): the value `schema_version` in
/// `db_settings` converges to once `sync_schema` succeeds. Never regressed;
/// a stored value greater than this would mean a newer binary wrote the
/// database, which the comparator/planner here aren't built to migrate
/// backwards from.
pub const SCHEMA_VERSION: &str = "1.3.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
  pub name: String,
  pub ty: String,
  pub not_null: bool,
  pub default: Option<String>,
  pub primary_key: bool,
  pub autoincrement: bool,
}

impl ColumnDef {
  pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ty: ty.into(),
      not_null: false,
      default: None,
      primary_key: false,
      autoincrement: false,
    }
  }

  pub fn not_null(mut self) -> Self {
    self.not_null = true;
    self
  }

  pub fn primary_key(mut self) -> Self {
    self.primary_key = true;
    self
  }

  pub fn autoincrement(mut self) -> Self {
    self.autoincrement = true;
    self.primary_key = true;
    self
  }

  pub fn default_value(mut self, default: impl Into<String>) -> Self {
    self.default = Some(default.into());
    self
  }

  /// Defaults shaped like a function call (`julianday('now')`, parenthesized
  /// expressions) are rejected by SQLite inside `ALTER TABLE ADD COLUMN`, per
  /// spec §4.2 rule 3.
  pub fn default_is_function_call(&self) -> bool {
    match &self.default {
      Some(d) => {
        let d = d.trim();
        d.starts_with('(') || d.contains("julianday") || d.contains('(')
      }
      None => false,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
  pub columns: Vec<String>,
  pub references_table: String,
  pub references_columns: Vec<String>,
  pub on_delete: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueConstraint {
  pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Table {
  pub columns: Vec<ColumnDef>,
  pub foreign_keys: Vec<ForeignKey>,
  pub unique_constraints: Vec<UniqueConstraint>,
  pub check_constraints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualTable {
  pub name: String,
  pub ty: String,
  pub columns: Vec<String>,
  pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDef {
  pub name: String,
  pub table: String,
  pub columns: Vec<String>,
  pub unique: bool,
  pub where_clause: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Schema {
  pub version: String,
  pub tables: BTreeMap<String, Table>,
  pub indexes: Vec<IndexDef>,
  pub virtual_tables: Vec<VirtualTable>,
}

/// A row of `PRAGMA table_info(...)`, used by the comparator to introspect
/// the live database (spec §4.2).
#[derive(Debug, Clone)]
pub struct ColumnInfo {
  pub name: String,
  pub ty: String,
  pub not_null: bool,
  pub default: Option<String>,
  pub primary_key: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableDiff {
  pub missing_columns: Vec<ColumnDef>,
  pub extra_columns: Vec<String>,
  pub type_changes: Vec<(String, String, String)>,
  pub constraint_changes: Vec<String>,
}

impl TableDiff {
  pub fn has_changes(&self) -> bool {
    !self.missing_columns.is_empty()
      || !self.extra_columns.is_empty()
      || !self.type_changes.is_empty()
      || !self.constraint_changes.is_empty()
  }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
  pub missing_tables: BTreeSet<String>,
  pub extra_tables: BTreeSet<String>,
  pub table_diffs: BTreeMap<String, TableDiff>,
  pub missing_indexes: Vec<IndexDef>,
  pub extra_indexes: Vec<String>,
  pub constraint_diffs: BTreeMap<String, Vec<String>>,
  pub missing_virtual_tables: BTreeMap<String, VirtualTable>,
  pub changed_virtual_tables: BTreeMap<String, VirtualTable>,
}

impl SchemaDiff {
  pub fn has_changes(&self) -> bool {
    !self.missing_tables.is_empty()
      || !self.extra_tables.is_empty()
      || !self.table_diffs.is_empty()
      || !self.missing_indexes.is_empty()
      || !self.extra_indexes.is_empty()
      || !self.constraint_diffs.is_empty()
      || !self.missing_virtual_tables.is_empty()
      || !self.changed_virtual_tables.is_empty()
  }

  /// True when applying this diff requires dropping or rebuilding a table
  /// that may already hold rows (recreate, column drop via recreate, index
  /// drop); the trigger for the Backup Manager per spec §4.2.
  pub fn is_destructive(&self) -> bool {
    self.table_diffs.values().any(|d| !d.type_changes.is_empty())
      || !self.extra_indexes.is_empty()
      || !self.changed_virtual_tables.is_empty()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSyncResult {
  pub success: bool,
  pub backup_uuid: Option<Uuid>,
  pub changes_applied: Vec<String>,
  pub error: Option<String>,
}

impl SchemaSyncResult {
  pub fn ok(changes_applied: Vec<String>, backup_uuid: Option<Uuid>) -> Self {
    Self {
      success: true,
      backup_uuid,
      changes_applied,
      error: None,
    }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      backup_uuid: None,
      changes_applied: Vec::new(),
      error: Some(error.into()),
    }
  }
}
