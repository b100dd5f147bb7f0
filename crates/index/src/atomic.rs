use crate::parser::{ParsedFile, SourceParser};
use codestore_core::{AstTree, CstTree, Error, FileId, ProjectId, Result};
use codestore_db::Store;
use std::sync::Arc;
use tracing::warn;

/// Outcome of one `update_file_data_atomic` call (spec §4.5).
#[derive(Debug, Clone)]
pub struct FileUpdateOutcome {
  pub success: bool,
  pub file_id: Option<FileId>,
  pub ast_updated: bool,
  pub cst_updated: bool,
  pub entities_updated: bool,
  pub error: Option<String>,
}

impl FileUpdateOutcome {
  fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      file_id: None,
      ast_updated: false,
      cst_updated: false,
      entities_updated: false,
      error: Some(error.into()),
    }
  }
}

/// Rewrites every row derived from one file's source, per spec §4.5. Parsing
/// itself is delegated to a [`SourceParser`]; this type only owns the
/// clear-then-reinsert sequencing and the transactional contract.
pub struct AtomicFileUpdater {
  store: Arc<Store>,
  parser: Arc<dyn SourceParser>,
}

impl AtomicFileUpdater {
  pub fn new(store: Arc<Store>, parser: Arc<dyn SourceParser>) -> Self {
    Self { store, parser }
  }

  /// Must run inside an active transaction; the caller (usually a larger
  /// multi-file operation) owns `begin_transaction`/`commit_transaction`.
  /// Fails `NotInTransaction` otherwise, since a partial rewrite left
  /// uncommitted would corrupt the derived tables (spec §4.5).
  pub fn update_file_data_atomic(
    &self,
    file_path: &str,
    project_id: ProjectId,
    root_dir: &str,
    source_code: &str,
  ) -> Result<FileUpdateOutcome> {
    if !self.store.in_transaction() {
      return Err(Error::NotInTransaction);
    }
    self.rewrite(file_path, project_id, root_dir, source_code)
  }

  /// Non-transactional sibling for bulk initial ingest (spec §4.5): same
  /// pipeline, wrapped in its own transaction rather than requiring one
  /// from the caller.
  pub fn update_file_data(&self, file_path: &str, project_id: ProjectId, root_dir: &str, source_code: &str) -> Result<FileUpdateOutcome> {
    self.store.transaction(|_| self.rewrite(file_path, project_id, root_dir, source_code))
  }

  fn rewrite(&self, file_path: &str, project_id: ProjectId, root_dir: &str, source_code: &str) -> Result<FileUpdateOutcome> {
    let _ = root_dir; // path resolution is by absolute path; root_dir is kept for the bulk-ingest caller's benefit

    let file = match self.store.get_file_by_project_and_path(project_id, file_path)? {
      Some(file) => file,
      None => return Ok(FileUpdateOutcome::failed(format!("no file row for {file_path}"))),
    };
    let file_id = file.id;

    let parsed = match self.parser.parse(source_code) {
      Ok(parsed) => parsed,
      Err(e) => return Ok(FileUpdateOutcome::failed(e.0)),
    };

    self.store.clear_file_derived_data(file_id)?;

    self.save_trees(file_id, &parsed, file.last_modified)?;
    self.insert_entities(file_id, &parsed)?;
    self.store.mark_file_needs_chunking(file_id)?;

    Ok(FileUpdateOutcome {
      success: true,
      file_id: Some(file_id),
      ast_updated: true,
      cst_updated: true,
      entities_updated: true,
      error: None,
    })
  }

  fn save_trees(&self, file_id: FileId, parsed: &ParsedFile, file_mtime: f64) -> Result<()> {
    self.store.save_ast_tree(&AstTree {
      file_id,
      ast_hash: parsed.ast_hash.clone(),
      tree: parsed.ast_tree.clone(),
      file_mtime,
    })?;
    self.store.save_cst_tree(&CstTree {
      file_id,
      cst_hash: parsed.cst_hash.clone(),
      tree: parsed.cst_tree.clone(),
      file_mtime,
    })?;
    Ok(())
  }

  fn insert_entities(&self, file_id: FileId, parsed: &ParsedFile) -> Result<()> {
    for class in &parsed.classes {
      let class_id = self
        .store
        .insert_class(file_id, &class.name, class.line, class.end_line, class.docstring.as_deref(), &class.bases)?;
      for method in &class.methods {
        self.store.insert_method(
          class_id,
          &method.name,
          method.line,
          method.end_line,
          &method.args,
          method.docstring.as_deref(),
          method.is_abstract,
          method.has_pass,
          method.has_not_implemented,
          method.complexity,
        )?;
      }
    }

    for function in &parsed.functions {
      self.store.insert_function(
        file_id,
        &function.name,
        function.line,
        function.end_line,
        &function.args,
        function.docstring.as_deref(),
        function.complexity,
      )?;
    }

    for import in &parsed.imports {
      self.store.insert_import(file_id, &import.name, import.module.as_deref(), &import.import_type, import.line)?;
    }

    for usage in &parsed.usages {
      if let Err(e) = self.store.insert_usage(
        file_id,
        usage.line,
        &usage.usage_type,
        usage.target_type,
        usage.target_class.as_deref(),
        &usage.target_name,
        usage.context.as_deref(),
      ) {
        warn!(file_id = file_id.0, line = usage.line, error = %e, "dropping unresolvable usage row");
      }
    }

    Ok(())
  }
}
