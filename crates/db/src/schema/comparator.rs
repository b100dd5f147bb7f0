use crate::Driver;
use codestore_core::{Result, Schema, SchemaDiff, SqlValue, Table, TableDiff, VirtualTable};
use std::collections::{BTreeMap, BTreeSet};

/// Diffs a live database against a [`Schema`], the way
/// `original_source/code_analysis/core/database/schema_sync.py`'s
/// `SchemaComparator` does: table-by-table, column-by-column, with indexes
/// and virtual tables handled separately since SQLite exposes them through
/// different introspection pragmas.
pub struct SchemaComparator<'a> {
  driver: &'a mut dyn Driver,
}

impl<'a> SchemaComparator<'a> {
  pub fn new(driver: &'a mut dyn Driver) -> Self {
    Self { driver }
  }

  pub fn compare(&mut self, schema: &Schema) -> Result<SchemaDiff> {
    let mut diff = SchemaDiff::default();

    let current_tables = self.current_tables()?;
    let current_virtual = self.current_virtual_tables()?;

    for name in schema.tables.keys() {
      if !current_tables.contains(name) {
        diff.missing_tables.insert(name.clone());
      }
    }
    for name in &current_tables {
      if !schema.tables.contains_key(name) && !current_virtual.contains(name) {
        diff.extra_tables.insert(name.clone());
      }
    }

    for (name, table) in &schema.tables {
      if !current_tables.contains(name) {
        continue;
      }
      let table_diff = self.compare_table(name, table)?;
      if table_diff.has_changes() {
        diff.table_diffs.insert(name.clone(), table_diff);
      }
    }

    for vt in &schema.virtual_tables {
      if !current_virtual.contains(&vt.name) {
        diff.missing_virtual_tables.insert(vt.name.clone(), vt.clone());
      } else if self.virtual_table_changed(vt)? {
        diff.changed_virtual_tables.insert(vt.name.clone(), vt.clone());
      }
    }

    let current_indexes = self.current_indexes()?;
    for index in &schema.indexes {
      if !current_indexes.contains(&index.name) {
        diff.missing_indexes.push(index.clone());
      }
    }
    let declared_index_names: BTreeSet<String> = schema.indexes.iter().map(|i| i.name.clone()).collect();
    for name in &current_indexes {
      if !declared_index_names.contains(name) {
        diff.extra_indexes.push(name.clone());
      }
    }

    Ok(diff)
  }

  fn current_tables(&mut self) -> Result<BTreeSet<String>> {
    let rows = self.driver.fetch_all(
      "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
      &[],
    )?;
    Ok(
      rows
        .iter()
        .filter_map(|r| r.get_str("name").map(str::to_string))
        .collect(),
    )
  }

  fn current_virtual_tables(&mut self) -> Result<BTreeSet<String>> {
    let rows = self
      .driver
      .fetch_all("SELECT name FROM sqlite_master WHERE type = 'table' AND sql LIKE 'CREATE VIRTUAL TABLE%'", &[])?;
    Ok(
      rows
        .iter()
        .filter_map(|r| r.get_str("name").map(str::to_string))
        .collect(),
    )
  }

  fn current_indexes(&mut self) -> Result<BTreeSet<String>> {
    let rows = self.driver.fetch_all(
      "SELECT name FROM sqlite_master WHERE type = 'index' AND name NOT LIKE 'sqlite_autoindex_%'",
      &[],
    )?;
    Ok(
      rows
        .iter()
        .filter_map(|r| r.get_str("name").map(str::to_string))
        .collect(),
    )
  }

  fn compare_table(&mut self, name: &str, table: &Table) -> Result<TableDiff> {
    let mut diff = TableDiff::default();
    let current_columns = self.driver.table_info(name)?;
    let current_by_name: BTreeMap<String, _> = current_columns.iter().map(|c| (c.name.clone(), c)).collect();

    for column in &table.columns {
      match current_by_name.get(&column.name) {
        None => diff.missing_columns.push(column.clone()),
        Some(existing) => {
          if !types_compatible(&existing.ty, &column.ty) {
            diff
              .type_changes
              .push((column.name.clone(), existing.ty.clone(), column.ty.clone()));
          }
        }
      }
    }

    let declared_names: BTreeSet<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    for existing in &current_columns {
      if !declared_names.contains(existing.name.as_str()) {
        diff.extra_columns.push(existing.name.clone());
      }
    }

    Ok(diff)
  }

  /// Conservative policy ported from `_virtual_table_changed`: an FTS table
  /// is left alone unless its module type or a named column is missing, so
  /// unrelated option churn (tokenizer tuning, prefix indexes) doesn't
  /// trigger an unnecessary rebuild.
  fn virtual_table_changed(&mut self, vt: &VirtualTable) -> Result<bool> {
    let row = self.driver.fetch_one(
      "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
      &[SqlValue::Text(vt.name.clone())],
    )?;
    let Some(row) = row else { return Ok(true) };
    let Some(sql) = row.get_str("sql") else { return Ok(true) };
    let sql_lower = sql.to_lowercase();

    if !sql_lower.contains(&vt.ty.to_lowercase()) {
      return Ok(true);
    }
    for column in &vt.columns {
      if !sql_lower.contains(&column.to_lowercase()) {
        return Ok(true);
      }
    }
    Ok(false)
  }
}

fn types_compatible(existing: &str, declared: &str) -> bool {
  normalize_type(existing) == normalize_type(declared)
}

/// SQLite's type affinity rules collapse many spellings (`INT`, `INTEGER`,
/// `BIGINT`) onto the same storage class; compare by affinity bucket
/// instead of literal text so e.g. `INTEGER` vs `INT` isn't flagged as a
/// type change.
fn normalize_type(ty: &str) -> &'static str {
  let upper = ty.to_uppercase();
  if upper.contains("INT") {
    "integer"
  } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
    "text"
  } else if upper.contains("BLOB") || upper.is_empty() {
    "blob"
  } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
    "real"
  } else {
    "numeric"
  }
}
