use codestore_core::{ColumnDef, Schema, SchemaDiff, Table, UniqueConstraint};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// One SQL statement (or `BEGIN`/`COMMIT` marker) in an ordered migration
/// plan. Kept as a plain string list; the planner's job is ordering and
/// shape, not execution; `Store::sync_schema` runs the statements.
pub type MigrationPlan = Vec<String>;

/// Builds the ordered SQL plan that reconciles a database with [`SchemaDiff`]
/// against [`Schema`], mirroring `schema_sync.py::generate_migration_sql`:
/// creates before alters, FK-parent tables before their children, destructive
/// table rebuilds last, indexes last of all.
pub struct SchemaPlanner<'a> {
  schema: &'a Schema,
}

impl<'a> SchemaPlanner<'a> {
  pub fn new(schema: &'a Schema) -> Self {
    Self { schema }
  }

  pub fn generate_migration_sql(&self, diff: &SchemaDiff) -> MigrationPlan {
    let mut plan = Vec::new();

    for name in self.creation_order(&diff.missing_tables) {
      let table = &self.schema.tables[&name];
      plan.push(generate_create_table_sql(&name, table));
    }

    let mut recreate: BTreeSet<String> = BTreeSet::new();
    for (name, table_diff) in &diff.table_diffs {
      if !table_diff.type_changes.is_empty()
        || table_diff.missing_columns.iter().any(|c| c.default_is_function_call())
      {
        recreate.insert(name.clone());
      }
    }

    for (name, table_diff) in &diff.table_diffs {
      if recreate.contains(name) {
        continue;
      }
      for column in &table_diff.missing_columns {
        plan.push(generate_add_column_sql(name, column));
      }
    }

    for name in self.tables_recreate_order(&recreate) {
      let table = &self.schema.tables[&name];
      let missing: BTreeSet<&str> = diff
        .table_diffs
        .get(&name)
        .map(|d| d.missing_columns.iter().map(|c| c.name.as_str()).collect())
        .unwrap_or_default();
      plan.extend(generate_recreate_table_sql(&name, table, &missing));
    }

    for (name, vt) in &diff.missing_virtual_tables {
      plan.push(format!("DROP TABLE IF EXISTS {name}"));
      plan.push(generate_create_virtual_table_sql(vt));
      if let Some(rebuild) = generate_fts_rebuild_sql(vt) {
        plan.push(rebuild);
      }
      plan.extend(generate_fts_sync_triggers_sql(vt));
    }

    for (name, vt) in &diff.changed_virtual_tables {
      // External-content FTS tables hold no data of their own; the backing
      // table (`options["content"]`) is untouched by drop/recreate. But a
      // freshly created external-content FTS5 table does NOT retroactively
      // index whatever the backing table already holds, so the recreate is
      // followed by an explicit `('rebuild')` command and the sync triggers
      // are reinstalled (DROP/CREATE so a column-set change isn't left
      // pointing at stale column names). A contentless or internal-content
      // table would need its rows copied through a temp table instead; this
      // schema never declares one, so that path is intentionally not built
      // out here.
      plan.push(format!("DROP TABLE IF EXISTS {name}"));
      plan.push(generate_create_virtual_table_sql(vt));
      if let Some(rebuild) = generate_fts_rebuild_sql(vt) {
        plan.push(rebuild);
      }
      plan.extend(generate_fts_sync_triggers_sql(vt));
    }

    for name in &diff.extra_indexes {
      plan.push(format!("DROP INDEX IF EXISTS {name}"));
    }
    for index in &diff.missing_indexes {
      plan.push(generate_create_index_sql(index));
    }

    plan
  }

  /// Topological sort over `self.schema.tables`'s foreign keys, restricted
  /// to `names`: a table is only emitted once every table it references
  /// (and that is also in `names`) has already been emitted.
  fn creation_order(&self, names: &BTreeSet<String>) -> Vec<String> {
    topological_order(names, |name| {
      self
        .schema
        .tables
        .get(name)
        .map(|t| t.foreign_keys.iter().map(|fk| fk.references_table.clone()).collect())
        .unwrap_or_default()
    })
  }

  fn tables_recreate_order(&self, names: &BTreeSet<String>) -> Vec<String> {
    self.creation_order(names)
  }
}

fn topological_order(names: &BTreeSet<String>, deps_of: impl Fn(&str) -> Vec<String>) -> Vec<String> {
  let mut in_degree: BTreeMap<String, usize> = names.iter().map(|n| (n.clone(), 0)).collect();
  let mut dependents: BTreeMap<String, Vec<String>> = names.iter().map(|n| (n.clone(), Vec::new())).collect();

  for name in names {
    for dep in deps_of(name) {
      if names.contains(&dep) && dep != *name {
        *in_degree.get_mut(name).unwrap() += 1;
        dependents.get_mut(&dep).unwrap().push(name.clone());
      }
    }
  }

  let mut queue: VecDeque<String> = in_degree
    .iter()
    .filter(|(_, &deg)| deg == 0)
    .map(|(n, _)| n.clone())
    .collect();
  let mut order = Vec::new();

  while let Some(name) = queue.pop_front() {
    order.push(name.clone());
    if let Some(deps) = dependents.get(&name) {
      for dependent in deps.clone() {
        let degree = in_degree.get_mut(&dependent).unwrap();
        *degree -= 1;
        if *degree == 0 {
          queue.push_back(dependent);
        }
      }
    }
  }

  // Any remaining names form a cycle (shouldn't happen for a well-formed
  // schema); append them in name order rather than dropping them silently.
  for name in names {
    if !order.contains(name) {
      order.push(name.clone());
    }
  }

  order
}

pub fn generate_create_table_sql(name: &str, table: &Table) -> String {
  let mut parts: Vec<String> = table.columns.iter().map(column_sql).collect();

  for uc in &table.unique_constraints {
    parts.push(format!("UNIQUE ({})", uc.columns.join(", ")));
  }
  for fk in &table.foreign_keys {
    let mut fk_sql = format!(
      "FOREIGN KEY ({}) REFERENCES {}({})",
      fk.columns.join(", "),
      fk.references_table,
      fk.references_columns.join(", ")
    );
    if let Some(on_delete) = &fk.on_delete {
      fk_sql.push_str(&format!(" ON DELETE {on_delete}"));
    }
    parts.push(fk_sql);
  }
  for check in &table.check_constraints {
    parts.push(format!("CHECK ({check})"));
  }

  format!("CREATE TABLE IF NOT EXISTS {name} (\n  {}\n)", parts.join(",\n  "))
}

fn column_sql(column: &ColumnDef) -> String {
  let mut sql = format!("{} {}", column.name, column.ty);
  if column.primary_key {
    sql.push_str(" PRIMARY KEY");
    if column.autoincrement {
      sql.push_str(" AUTOINCREMENT");
    }
  }
  if column.not_null {
    sql.push_str(" NOT NULL");
  }
  if let Some(default) = &column.default {
    sql.push_str(&format!(" DEFAULT {default}"));
  }
  sql
}

fn generate_add_column_sql(table: &str, column: &ColumnDef) -> String {
  format!("ALTER TABLE {table} ADD COLUMN {}", column_sql(column))
}

/// Rename-to-temp, recreate, copy-intersection-columns, drop-temp sequence
/// ported from `_generate_recreate_table_sql`. When a unique constraint is
/// declared, rows are deduplicated by keeping the one with the largest
/// rowid per unique key (`ROW_NUMBER() OVER (PARTITION BY ... ORDER BY
/// rowid DESC)`), matching the Python implementation's tie-break.
///
/// `newly_missing` names declared columns absent from the table being
/// recreated (columns the recreate is itself adding alongside a type
/// change); those can't be selected out of the renamed temp table, so the
/// copy step only pulls the intersection and lets the new table's
/// `DEFAULT`/NULL apply to the rest.
pub fn generate_recreate_table_sql(name: &str, table: &Table, newly_missing: &BTreeSet<&str>) -> MigrationPlan {
  let temp_name = format!("temp_{name}");
  let mut plan = vec![
    format!("DROP TABLE IF EXISTS {temp_name}"),
    format!("ALTER TABLE {name} RENAME TO {temp_name}"),
    generate_create_table_sql(name, table),
  ];

  let declared_columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
  let intersection: Vec<&str> = declared_columns
    .iter()
    .copied()
    .filter(|c| !newly_missing.contains(c))
    .collect();
  let column_list = intersection.join(", ");

  match table.unique_constraints.first() {
    Some(UniqueConstraint { columns }) if columns.iter().all(|c| intersection.contains(&c.as_str())) => {
      plan.push(format!(
        "INSERT INTO {name} ({column_list})
SELECT {column_list} FROM (
  SELECT {column_list},
    ROW_NUMBER() OVER (PARTITION BY {partition} ORDER BY rowid DESC) AS rn
  FROM {temp_name}
) WHERE rn = 1",
        column_list = column_list,
        partition = columns.join(", "),
      ));
    }
    _ => {
      plan.push(format!("INSERT INTO {name} ({column_list}) SELECT {column_list} FROM {temp_name}"));
    }
  }

  plan.push(format!("DROP TABLE {temp_name}"));
  plan
}

/// External-content FTS5 tables (`options["content"]` names the backing
/// table) need an explicit rebuild command after creation to index rows the
/// backing table already holds; a fresh `CREATE VIRTUAL TABLE` has nothing
/// in it until this runs once.
fn generate_fts_rebuild_sql(vt: &codestore_core::VirtualTable) -> Option<String> {
  if vt.ty.eq_ignore_ascii_case("fts5") && vt.options.contains_key("content") {
    Some(format!("INSERT INTO {}({}) VALUES('rebuild')", vt.name, vt.name))
  } else {
    None
  }
}

/// External-content FTS5 tables track nothing automatically: SQLite doesn't
/// touch the index when the backing table changes unless triggers do it
/// (see <https://sqlite.org/fts5.html#external_content_tables>). These mirror
/// every insert/update/delete on `options["content"]` into the FTS table, so
/// `search_code_content` sees rows as soon as they're written, not just after
/// the next rebuild.
fn generate_fts_sync_triggers_sql(vt: &codestore_core::VirtualTable) -> Vec<String> {
  let (content_table, rowid_col) = match (vt.options.get("content"), vt.options.get("content_rowid")) {
    (Some(content), rowid) => (content.clone(), rowid.cloned().unwrap_or_else(|| "rowid".to_string())),
    None => return Vec::new(),
  };
  if !vt.ty.eq_ignore_ascii_case("fts5") {
    return Vec::new();
  }

  let cols = vt.columns.join(", ");
  let new_cols = vt.columns.iter().map(|c| format!("new.{c}")).collect::<Vec<_>>().join(", ");
  let old_cols = vt.columns.iter().map(|c| format!("old.{c}")).collect::<Vec<_>>().join(", ");
  let name = &vt.name;

  vec![
    format!("DROP TRIGGER IF EXISTS {name}_ai"),
    format!(
      "CREATE TRIGGER {name}_ai AFTER INSERT ON {content_table} BEGIN\n  INSERT INTO {name}(rowid, {cols}) VALUES (new.{rowid_col}, {new_cols});\nEND"
    ),
    format!("DROP TRIGGER IF EXISTS {name}_ad"),
    format!(
      "CREATE TRIGGER {name}_ad AFTER DELETE ON {content_table} BEGIN\n  INSERT INTO {name}({name}, rowid, {cols}) VALUES ('delete', old.{rowid_col}, {old_cols});\nEND"
    ),
    format!("DROP TRIGGER IF EXISTS {name}_au"),
    format!(
      "CREATE TRIGGER {name}_au AFTER UPDATE ON {content_table} BEGIN\n  INSERT INTO {name}({name}, rowid, {cols}) VALUES ('delete', old.{rowid_col}, {old_cols});\n  INSERT INTO {name}(rowid, {cols}) VALUES (new.{rowid_col}, {new_cols});\nEND"
    ),
  ]
}

fn generate_create_virtual_table_sql(vt: &codestore_core::VirtualTable) -> String {
  let mut args: Vec<String> = vt.columns.clone();
  for (key, value) in &vt.options {
    args.push(format!("{key}='{value}'"));
  }
  format!("CREATE VIRTUAL TABLE {} USING {}({})", vt.name, vt.ty, args.join(", "))
}

pub fn generate_create_index_sql(index: &codestore_core::IndexDef) -> String {
  let unique = if index.unique { "UNIQUE " } else { "" };
  let mut sql = format!(
    "CREATE {unique}INDEX IF NOT EXISTS {} ON {} ({})",
    index.name,
    index.table,
    index.columns.join(", ")
  );
  if let Some(where_clause) = &index.where_clause {
    sql.push_str(&format!(" WHERE {where_clause}"));
  }
  sql
}
