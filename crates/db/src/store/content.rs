use super::Store;
use codestore_core::{AstTree, ClassId, CodeContent, ContentOwner, CstTree, FileId, FunctionId, MethodId, Result, Row, SqlValue};

impl Store {
  /// Saves an AST snapshot, a no-op if a row with the same
  /// `(file_id, ast_hash)` already exists; re-parsing an unchanged file
  /// produces the same hash and shouldn't duplicate the tree (spec §4.5).
  pub fn save_ast_tree(&self, tree: &AstTree) -> Result<()> {
    self.execute(
      "INSERT INTO ast_trees (file_id, ast_hash, tree, file_mtime) VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT(file_id, ast_hash) DO NOTHING",
      &[
        SqlValue::Integer(tree.file_id.0),
        SqlValue::Text(tree.ast_hash.clone()),
        SqlValue::Text(tree.tree.clone()),
        SqlValue::Real(tree.file_mtime),
      ],
    )?;
    Ok(())
  }

  pub fn save_cst_tree(&self, tree: &CstTree) -> Result<()> {
    self.execute(
      "INSERT INTO cst_trees (file_id, cst_hash, tree, file_mtime) VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT(file_id, cst_hash) DO NOTHING",
      &[
        SqlValue::Integer(tree.file_id.0),
        SqlValue::Text(tree.cst_hash.clone()),
        SqlValue::Text(tree.tree.clone()),
        SqlValue::Real(tree.file_mtime),
      ],
    )?;
    Ok(())
  }

  /// Removes the AST/CST snapshots recorded for `file_id`, ahead of saving
  /// the ones freshly parsed from the new source (spec §4.5 step 3). Unlike
  /// `classes`/`functions`/etc, tree rows are not replaced by a simple
  /// overwrite; `(file_id, hash)` is the unique key, so a stale tree with a
  /// different hash would otherwise linger forever.
  pub fn clear_trees_for_file(&self, file_id: FileId) -> Result<()> {
    self.execute("DELETE FROM ast_trees WHERE file_id = ?1", &[SqlValue::Integer(file_id.0)])?;
    self.execute("DELETE FROM cst_trees WHERE file_id = ?1", &[SqlValue::Integer(file_id.0)])?;
    Ok(())
  }

  pub fn insert_code_content(&self, content: &CodeContent) -> Result<()> {
    let (owner_kind, class_id, method_id, function_id) = match content.owner {
      ContentOwner::Class(id) => ("class", Some(id.0), None, None),
      ContentOwner::Method(id) => ("method", None, Some(id.0), None),
      ContentOwner::Function(id) => ("function", None, None, Some(id.0)),
    };

    self.execute(
      "INSERT INTO code_content (file_id, owner_kind, owner_class_id, owner_method_id, owner_function_id, content, docstring)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      &[
        SqlValue::Integer(content.file_id.0),
        SqlValue::Text(owner_kind.to_string()),
        SqlValue::from(class_id),
        SqlValue::from(method_id),
        SqlValue::from(function_id),
        SqlValue::Text(content.content.clone()),
        SqlValue::from(content.docstring.clone()),
      ],
    )?;
    Ok(())
  }

  /// Full-text search over saved code content, delegating ranking to the
  /// FTS5 extension's `bm25()` (spec §1 persistence-layer scope: "full-text
  /// inverted-index extension"; ranking itself is out of scope beyond
  /// exposing the score).
  pub fn search_code_content(&self, query: &str, limit: i64) -> Result<Vec<(CodeContent, f64)>> {
    let rows = self.fetch_all(
      "SELECT cc.*, bm25(code_content_fts) AS score
       FROM code_content_fts
       JOIN code_content cc ON cc.id = code_content_fts.rowid
       WHERE code_content_fts MATCH ?1
       ORDER BY score
       LIMIT ?2",
      &[SqlValue::Text(query.to_string()), SqlValue::Integer(limit)],
    )?;
    rows
      .iter()
      .map(|r| Ok((row_to_code_content(r)?, r.get_f64("score").unwrap_or(0.0))))
      .collect()
  }
}

fn row_to_code_content(row: &Row) -> Result<CodeContent> {
  let owner = match row.get_str("owner_kind").unwrap_or_default() {
    "class" => ContentOwner::Class(ClassId(row.get_i64("owner_class_id").unwrap())),
    "method" => ContentOwner::Method(MethodId(row.get_i64("owner_method_id").unwrap())),
    "function" => ContentOwner::Function(FunctionId(row.get_i64("owner_function_id").unwrap())),
    other => return Err(codestore_core::Error::InvalidCrossRef(format!("unknown content owner kind '{other}'"))),
  };

  Ok(CodeContent {
    file_id: FileId(row.get_i64("file_id").unwrap()),
    owner,
    content: row.get_str("content").unwrap_or_default().to_string(),
    docstring: row.get_str("docstring").map(str::to_string),
  })
}
