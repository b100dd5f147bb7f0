use super::Store;
use codestore_core::{
  CalleeRef, CallerRef, ClassId, CrossRefId, EntityCrossRef, EntityKind, Error, FileId, FunctionId, KNOWN_REF_TYPES,
  MethodId, ProjectId, Result, Row, SqlValue, Usage, UsageId,
};

impl Store {
  pub fn insert_usage(
    &self,
    file_id: FileId,
    line: i64,
    usage_type: &str,
    target_type: EntityKind,
    target_class: Option<&str>,
    target_name: &str,
    context: Option<&str>,
  ) -> Result<UsageId> {
    self.execute(
      "INSERT INTO usages (file_id, line, usage_type, target_type, target_class, target_name, context)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      &[
        SqlValue::Integer(file_id.0),
        SqlValue::Integer(line),
        SqlValue::Text(usage_type.to_string()),
        SqlValue::Text(target_type.as_str().to_string()),
        SqlValue::from(target_class.map(str::to_string)),
        SqlValue::Text(target_name.to_string()),
        SqlValue::from(context.map(str::to_string)),
      ],
    )?;
    Ok(UsageId(self.last_insert_rowid()?))
  }

  pub fn raw_usages_for_file(&self, file_id: FileId) -> Result<Vec<Usage>> {
    let rows = self.fetch_all("SELECT * FROM usages WHERE file_id = ?1 ORDER BY line", &[SqlValue::Integer(file_id.0)])?;
    rows.iter().map(row_to_usage).collect()
  }

  pub fn insert_entity_cross_ref(&self, caller: CallerRef, callee: CalleeRef, ref_type: &str, file_id: FileId, line: i64) -> Result<CrossRefId> {
    if !KNOWN_REF_TYPES.contains(&ref_type) {
      return Err(Error::InvalidCrossRef(format!("unknown ref_type '{ref_type}'")));
    }
    let (caller_class, caller_method, caller_function) = caller_columns(caller);
    let (callee_class, callee_method, callee_function) = callee_columns(callee);

    self.execute(
      "INSERT INTO entity_cross_refs
         (caller_kind, caller_class_id, caller_method_id, caller_function_id,
          callee_kind, callee_class_id, callee_method_id, callee_function_id,
          ref_type, file_id, line)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
      &[
        SqlValue::Text(caller.kind().as_str().to_string()),
        SqlValue::from(caller_class),
        SqlValue::from(caller_method),
        SqlValue::from(caller_function),
        SqlValue::Text(callee.kind().as_str().to_string()),
        SqlValue::from(callee_class),
        SqlValue::from(callee_method),
        SqlValue::from(callee_function),
        SqlValue::Text(ref_type.to_string()),
        SqlValue::Integer(file_id.0),
        SqlValue::Integer(line),
      ],
    )?;
    Ok(CrossRefId(self.last_insert_rowid()?))
  }

  pub fn cross_refs_for_file(&self, file_id: FileId) -> Result<Vec<EntityCrossRef>> {
    let rows = self.fetch_all(
      "SELECT * FROM entity_cross_refs WHERE file_id = ?1 ORDER BY line",
      &[SqlValue::Integer(file_id.0)],
    )?;
    rows.iter().map(row_to_cross_ref).collect()
  }

  /// Every resolved cross-ref where `caller` is the caller side (spec §4.4).
  pub fn get_dependencies_by_caller(&self, caller: CallerRef) -> Result<Vec<EntityCrossRef>> {
    let (column, id) = match caller {
      CallerRef::Class(id) => ("caller_class_id", id.0),
      CallerRef::Method(id) => ("caller_method_id", id.0),
      CallerRef::Function(id) => ("caller_function_id", id.0),
    };
    let sql = format!("SELECT * FROM entity_cross_refs WHERE {column} = ?1 ORDER BY id");
    let rows = self.fetch_all(&sql, &[SqlValue::Integer(id)])?;
    rows.iter().map(row_to_cross_ref).collect()
  }

  /// Every resolved cross-ref where `callee` is the callee side (spec §4.4).
  pub fn get_dependents_by_callee(&self, callee: CalleeRef) -> Result<Vec<EntityCrossRef>> {
    let (column, id) = match callee {
      CalleeRef::Class(id) => ("callee_class_id", id.0),
      CalleeRef::Method(id) => ("callee_method_id", id.0),
      CalleeRef::Function(id) => ("callee_function_id", id.0),
    };
    let sql = format!("SELECT * FROM entity_cross_refs WHERE {column} = ?1 ORDER BY id");
    let rows = self.fetch_all(&sql, &[SqlValue::Integer(id)])?;
    rows.iter().map(row_to_cross_ref).collect()
  }

  /// Removes cross-refs that either originate in `file_id` or whose caller
  /// or callee entity is owned by it (spec §4.4); a cross-ref can name a
  /// same-project, different-file callee, so clearing by `file_id` alone
  /// would leave stale rows pointing at entities this file just deleted.
  pub fn delete_entity_cross_ref_for_file(&self, file_id: FileId) -> Result<()> {
    self.execute(
      "DELETE FROM entity_cross_refs
       WHERE file_id = ?1
          OR caller_class_id IN (SELECT id FROM classes WHERE file_id = ?1)
          OR caller_method_id IN (SELECT m.id FROM methods m JOIN classes c ON m.class_id = c.id WHERE c.file_id = ?1)
          OR caller_function_id IN (SELECT id FROM functions WHERE file_id = ?1)
          OR callee_class_id IN (SELECT id FROM classes WHERE file_id = ?1)
          OR callee_method_id IN (SELECT m.id FROM methods m JOIN classes c ON m.class_id = c.id WHERE c.file_id = ?1)
          OR callee_function_id IN (SELECT id FROM functions WHERE file_id = ?1)",
      &[SqlValue::Integer(file_id.0)],
    )?;
    Ok(())
  }

  /// Finds the entity a usage names, searching the whole project rather
  /// than just `file_id` (spec §4.6). A method lookup requires
  /// `target_class` to disambiguate two same-named methods on different
  /// classes; a class or function lookup ignores it. Each branch orders by
  /// `(declaring_file_id = file_id) DESC` so a same-file declaration wins
  /// over any other file in the project, matching
  /// `entity_cross_ref_builder.py::resolve_callee`.
  pub fn find_callee(
    &self,
    project_id: ProjectId,
    file_id: FileId,
    target_type: EntityKind,
    target_name: &str,
    target_class: Option<&str>,
  ) -> Result<Option<NamedEntity>> {
    let row = match target_type {
      EntityKind::Class => self.fetch_one(
        "SELECT c.id as id, c.name as name
         FROM classes c JOIN files f ON c.file_id = f.id
         WHERE f.project_id = ?1 AND c.name = ?2
         ORDER BY (c.file_id = ?3) DESC, c.id
         LIMIT 1",
        &[SqlValue::Text(project_id.to_string()), SqlValue::Text(target_name.to_string()), SqlValue::Integer(file_id.0)],
      )?,
      EntityKind::Function => self.fetch_one(
        "SELECT fn.id as id, fn.name as name
         FROM functions fn JOIN files f ON fn.file_id = f.id
         WHERE f.project_id = ?1 AND fn.name = ?2
         ORDER BY (fn.file_id = ?3) DESC, fn.id
         LIMIT 1",
        &[SqlValue::Text(project_id.to_string()), SqlValue::Text(target_name.to_string()), SqlValue::Integer(file_id.0)],
      )?,
      EntityKind::Method => {
        let Some(owner_class) = target_class else { return Ok(None) };
        self.fetch_one(
          "SELECT m.id as id, m.name as name, c.name as class_name
           FROM methods m JOIN classes c ON m.class_id = c.id JOIN files f ON c.file_id = f.id
           WHERE f.project_id = ?1 AND m.name = ?2 AND c.name = ?3
           ORDER BY (c.file_id = ?4) DESC, m.id
           LIMIT 1",
          &[
            SqlValue::Text(project_id.to_string()),
            SqlValue::Text(target_name.to_string()),
            SqlValue::Text(owner_class.to_string()),
            SqlValue::Integer(file_id.0),
          ],
        )?
      }
    };

    Ok(row.map(|row| NamedEntity {
      kind: target_type,
      name: row.get_str("name").unwrap_or_default().to_string(),
      id: row.get_i64("id").unwrap_or(0),
      owner_class: match target_type {
        EntityKind::Method => row.get_str("class_name").map(str::to_string),
        _ => None,
      },
    }))
  }

  /// All enclosing-span candidates (class, method, function) declared in
  /// `file_id`, with their line ranges, for `resolve_caller`'s
  /// smallest-enclosing-span search (spec §4.6).
  pub fn entity_spans_for_file(&self, file_id: FileId) -> Result<Vec<EntitySpan>> {
    let mut spans = Vec::new();
    for row in self.fetch_all("SELECT id, line, end_line FROM classes WHERE file_id = ?1", &[SqlValue::Integer(file_id.0)])? {
      spans.push(EntitySpan {
        kind: EntityKind::Class,
        id: row.get_i64("id").unwrap_or(0),
        start_line: row.get_i64("line").unwrap_or(0),
        end_line: row.get_i64("end_line"),
      });
    }
    for row in self.fetch_all("SELECT id, line, end_line FROM functions WHERE file_id = ?1", &[SqlValue::Integer(file_id.0)])? {
      spans.push(EntitySpan {
        kind: EntityKind::Function,
        id: row.get_i64("id").unwrap_or(0),
        start_line: row.get_i64("line").unwrap_or(0),
        end_line: row.get_i64("end_line"),
      });
    }
    for row in self.fetch_all(
      "SELECT m.id as id, m.line as line, m.end_line as end_line
       FROM methods m JOIN classes c ON m.class_id = c.id WHERE c.file_id = ?1",
      &[SqlValue::Integer(file_id.0)],
    )? {
      spans.push(EntitySpan {
        kind: EntityKind::Method,
        id: row.get_i64("id").unwrap_or(0),
        start_line: row.get_i64("line").unwrap_or(0),
        end_line: row.get_i64("end_line"),
      });
    }
    Ok(spans)
  }
}

/// One named, declared entity, for the cross-ref builder's by-name lookup.
#[derive(Debug, Clone)]
pub struct NamedEntity {
  pub kind: EntityKind,
  pub name: String,
  pub id: i64,
  pub owner_class: Option<String>,
}

/// A declared entity's line span, used for enclosing-scope lookups.
#[derive(Debug, Clone, Copy)]
pub struct EntitySpan {
  pub kind: EntityKind,
  pub id: i64,
  pub start_line: i64,
  pub end_line: Option<i64>,
}

fn caller_columns(caller: CallerRef) -> (Option<i64>, Option<i64>, Option<i64>) {
  match caller {
    CallerRef::Class(id) => (Some(id.0), None, None),
    CallerRef::Method(id) => (None, Some(id.0), None),
    CallerRef::Function(id) => (None, None, Some(id.0)),
  }
}

fn callee_columns(callee: CalleeRef) -> (Option<i64>, Option<i64>, Option<i64>) {
  match callee {
    CalleeRef::Class(id) => (Some(id.0), None, None),
    CalleeRef::Method(id) => (None, Some(id.0), None),
    CalleeRef::Function(id) => (None, None, Some(id.0)),
  }
}

fn row_to_usage(row: &Row) -> Result<Usage> {
  Ok(Usage {
    id: UsageId(row.get_i64("id").unwrap()),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    line: row.get_i64("line").unwrap_or(0),
    usage_type: row.get_str("usage_type").unwrap_or_default().to_string(),
    target_type: row.get_str("target_type").unwrap_or_default().parse()?,
    target_class: row.get_str("target_class").map(str::to_string),
    target_name: row.get_str("target_name").unwrap_or_default().to_string(),
    context: row.get_str("context").map(str::to_string),
  })
}

fn row_to_cross_ref(row: &Row) -> Result<EntityCrossRef> {
  let caller = match row.get_str("caller_kind").unwrap_or_default() {
    "class" => CallerRef::Class(ClassId(row.get_i64("caller_class_id").unwrap())),
    "method" => CallerRef::Method(MethodId(row.get_i64("caller_method_id").unwrap())),
    "function" => CallerRef::Function(FunctionId(row.get_i64("caller_function_id").unwrap())),
    other => return Err(codestore_core::Error::InvalidCrossRef(format!("unknown caller kind '{other}'"))),
  };
  let callee = match row.get_str("callee_kind").unwrap_or_default() {
    "class" => CalleeRef::Class(ClassId(row.get_i64("callee_class_id").unwrap())),
    "method" => CalleeRef::Method(MethodId(row.get_i64("callee_method_id").unwrap())),
    "function" => CalleeRef::Function(FunctionId(row.get_i64("callee_function_id").unwrap())),
    other => return Err(codestore_core::Error::InvalidCrossRef(format!("unknown callee kind '{other}'"))),
  };

  Ok(EntityCrossRef {
    id: CrossRefId(row.get_i64("id").unwrap()),
    caller,
    callee,
    ref_type: row.get_str("ref_type").unwrap_or_default().to_string(),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    line: row.get_i64("line").unwrap_or(0),
  })
}
