use super::Store;
use codestore_core::{Class, ClassId, FileId, Function, FunctionId, Import, ImportId, Method, MethodId, Result, Row, SqlValue};

impl Store {
  pub fn insert_class(&self, file_id: FileId, name: &str, line: i64, end_line: Option<i64>, docstring: Option<&str>, bases: &str) -> Result<ClassId> {
    self.execute(
      "INSERT INTO classes (file_id, name, line, end_line, docstring, bases) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      &[
        SqlValue::Integer(file_id.0),
        SqlValue::Text(name.to_string()),
        SqlValue::Integer(line),
        SqlValue::from(end_line),
        SqlValue::from(docstring.map(str::to_string)),
        SqlValue::Text(bases.to_string()),
      ],
    )?;
    Ok(ClassId(self.last_insert_rowid()?))
  }

  pub fn insert_method(
    &self,
    class_id: ClassId,
    name: &str,
    line: i64,
    end_line: Option<i64>,
    args: &str,
    docstring: Option<&str>,
    is_abstract: bool,
    has_pass: bool,
    has_not_implemented: bool,
    complexity: Option<i64>,
  ) -> Result<MethodId> {
    self.execute(
      "INSERT INTO methods (class_id, name, line, end_line, args, docstring, is_abstract, has_pass, has_not_implemented, complexity)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      &[
        SqlValue::Integer(class_id.0),
        SqlValue::Text(name.to_string()),
        SqlValue::Integer(line),
        SqlValue::from(end_line),
        SqlValue::Text(args.to_string()),
        SqlValue::from(docstring.map(str::to_string)),
        SqlValue::from(is_abstract),
        SqlValue::from(has_pass),
        SqlValue::from(has_not_implemented),
        SqlValue::from(complexity),
      ],
    )?;
    Ok(MethodId(self.last_insert_rowid()?))
  }

  pub fn insert_function(
    &self,
    file_id: FileId,
    name: &str,
    line: i64,
    end_line: Option<i64>,
    args: &str,
    docstring: Option<&str>,
    complexity: Option<i64>,
  ) -> Result<FunctionId> {
    self.execute(
      "INSERT INTO functions (file_id, name, line, end_line, args, docstring, complexity) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      &[
        SqlValue::Integer(file_id.0),
        SqlValue::Text(name.to_string()),
        SqlValue::Integer(line),
        SqlValue::from(end_line),
        SqlValue::Text(args.to_string()),
        SqlValue::from(docstring.map(str::to_string)),
        SqlValue::from(complexity),
      ],
    )?;
    Ok(FunctionId(self.last_insert_rowid()?))
  }

  pub fn insert_import(&self, file_id: FileId, name: &str, module: Option<&str>, import_type: &str, line: i64) -> Result<ImportId> {
    self.execute(
      "INSERT INTO imports (file_id, name, module, import_type, line) VALUES (?1, ?2, ?3, ?4, ?5)",
      &[
        SqlValue::Integer(file_id.0),
        SqlValue::Text(name.to_string()),
        SqlValue::from(module.map(str::to_string)),
        SqlValue::Text(import_type.to_string()),
        SqlValue::Integer(line),
      ],
    )?;
    Ok(ImportId(self.last_insert_rowid()?))
  }

  pub fn classes_for_file(&self, file_id: FileId) -> Result<Vec<Class>> {
    let rows = self.fetch_all("SELECT * FROM classes WHERE file_id = ?1 ORDER BY line", &[SqlValue::Integer(file_id.0)])?;
    Ok(rows.iter().map(row_to_class).collect())
  }

  pub fn methods_for_class(&self, class_id: ClassId) -> Result<Vec<Method>> {
    let rows = self.fetch_all("SELECT * FROM methods WHERE class_id = ?1 ORDER BY line", &[SqlValue::Integer(class_id.0)])?;
    Ok(rows.iter().map(row_to_method).collect())
  }

  pub fn functions_for_file(&self, file_id: FileId) -> Result<Vec<Function>> {
    let rows = self.fetch_all("SELECT * FROM functions WHERE file_id = ?1 ORDER BY line", &[SqlValue::Integer(file_id.0)])?;
    Ok(rows.iter().map(row_to_function).collect())
  }

  pub fn imports_for_file(&self, file_id: FileId) -> Result<Vec<Import>> {
    let rows = self.fetch_all("SELECT * FROM imports WHERE file_id = ?1 ORDER BY line", &[SqlValue::Integer(file_id.0)])?;
    Ok(rows.iter().map(row_to_import).collect())
  }

  /// Deletes every row derived from `file_id` across every table the
  /// atomic updater rewrites (spec §4.5), ahead of reinserting fresh data
  /// in the same transaction. Child rows (methods, under classes) cascade
  /// via `ON DELETE CASCADE`. Cross-refs, trees and chunks have their own
  /// clearing rules (a cross-ref can name a different file as callee; a
  /// tree's unique key is content hash, not just `file_id`) so they live in
  /// `delete_entity_cross_ref_for_file`, `clear_trees_for_file`, and
  /// `clear_chunks_for_file` respectively; this method does not duplicate
  /// them; callers invoke all four as one clearing step.
  pub fn clear_file_derived_data(&self, file_id: FileId) -> Result<()> {
    let id = SqlValue::Integer(file_id.0);
    self.execute("DELETE FROM classes WHERE file_id = ?1", std::slice::from_ref(&id))?;
    self.execute("DELETE FROM functions WHERE file_id = ?1", std::slice::from_ref(&id))?;
    self.execute("DELETE FROM imports WHERE file_id = ?1", std::slice::from_ref(&id))?;
    self.execute("DELETE FROM usages WHERE file_id = ?1", std::slice::from_ref(&id))?;
    self.execute("DELETE FROM code_content WHERE file_id = ?1", std::slice::from_ref(&id))?;
    self.delete_entity_cross_ref_for_file(file_id)?;
    self.clear_trees_for_file(file_id)?;
    self.clear_chunks_for_file(file_id)?;
    Ok(())
  }
}

fn row_to_class(row: &Row) -> Class {
  Class {
    id: ClassId(row.get_i64("id").unwrap()),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    name: row.get_str("name").unwrap().to_string(),
    line: row.get_i64("line").unwrap_or(0),
    end_line: row.get_i64("end_line"),
    docstring: row.get_str("docstring").map(str::to_string),
    bases: row.get_str("bases").unwrap_or("[]").to_string(),
  }
}

fn row_to_method(row: &Row) -> Method {
  Method {
    id: MethodId(row.get_i64("id").unwrap()),
    class_id: ClassId(row.get_i64("class_id").unwrap()),
    name: row.get_str("name").unwrap().to_string(),
    line: row.get_i64("line").unwrap_or(0),
    end_line: row.get_i64("end_line"),
    args: row.get_str("args").unwrap_or("[]").to_string(),
    docstring: row.get_str("docstring").map(str::to_string),
    is_abstract: row.get_i64("is_abstract").unwrap_or(0) != 0,
    has_pass: row.get_i64("has_pass").unwrap_or(0) != 0,
    has_not_implemented: row.get_i64("has_not_implemented").unwrap_or(0) != 0,
    complexity: row.get_i64("complexity"),
  }
}

fn row_to_function(row: &Row) -> Function {
  Function {
    id: FunctionId(row.get_i64("id").unwrap()),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    name: row.get_str("name").unwrap().to_string(),
    line: row.get_i64("line").unwrap_or(0),
    end_line: row.get_i64("end_line"),
    args: row.get_str("args").unwrap_or("[]").to_string(),
    docstring: row.get_str("docstring").map(str::to_string),
    complexity: row.get_i64("complexity"),
  }
}

fn row_to_import(row: &Row) -> Import {
  Import {
    id: ImportId(row.get_i64("id").unwrap()),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    name: row.get_str("name").unwrap().to_string(),
    module: row.get_str("module").map(str::to_string),
    import_type: row.get_str("import_type").unwrap_or_default().to_string(),
    line: row.get_i64("line").unwrap_or(0),
  }
}
