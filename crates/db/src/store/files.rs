use super::Store;
use codestore_core::{DatasetId, File, FileId, ProjectId, Result, Row, SqlValue, WatchDirId};

impl Store {
  /// Inserts a file row, or updates it in place (by `dataset_id` + `path`)
  /// if one already exists, returning the resolved id either way. Spec
  /// §4.5's atomic updater resolves the file id through this before
  /// rewriting any derived data.
  pub fn upsert_file(&self, file: &NewFile) -> Result<FileId> {
    let existing = self.fetch_one(
      "SELECT id FROM files WHERE dataset_id = ?1 AND path = ?2",
      &[SqlValue::Text(file.dataset_id.to_string()), SqlValue::Text(file.path.clone())],
    )?;

    if let Some(row) = existing {
      let id = FileId(row.get_i64("id").unwrap());
      self.execute(
        "UPDATE files SET relative_path = ?2, lines = ?3, last_modified = ?4, has_docstring = ?5,
                           deleted = 0, original_path = ?6, version_dir = ?7, needs_chunking = 1
         WHERE id = ?1",
        &[
          SqlValue::Integer(id.0),
          SqlValue::Text(file.relative_path.clone()),
          SqlValue::Integer(file.lines),
          SqlValue::Real(file.last_modified),
          SqlValue::from(file.has_docstring),
          SqlValue::from(file.original_path.clone()),
          SqlValue::from(file.version_dir.clone()),
        ],
      )?;
      return Ok(id);
    }

    self.execute(
      "INSERT INTO files (project_id, dataset_id, watch_dir_id, path, relative_path, lines, last_modified,
                           has_docstring, deleted, original_path, version_dir, needs_chunking)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, 1)",
      &[
        SqlValue::Text(file.project_id.to_string()),
        SqlValue::Text(file.dataset_id.to_string()),
        SqlValue::from(file.watch_dir_id.map(|w| w.to_string())),
        SqlValue::Text(file.path.clone()),
        SqlValue::Text(file.relative_path.clone()),
        SqlValue::Integer(file.lines),
        SqlValue::Real(file.last_modified),
        SqlValue::from(file.has_docstring),
        SqlValue::from(file.original_path.clone()),
        SqlValue::from(file.version_dir.clone()),
      ],
    )?;
    Ok(FileId(self.last_insert_rowid()?))
  }

  pub fn get_file(&self, id: FileId) -> Result<Option<File>> {
    let row = self.fetch_one("SELECT * FROM files WHERE id = ?1", &[SqlValue::Integer(id.0)])?;
    Ok(row.map(|r| row_to_file(&r)))
  }

  pub fn get_file_by_path(&self, dataset_id: DatasetId, path: &str) -> Result<Option<File>> {
    let row = self.fetch_one(
      "SELECT * FROM files WHERE dataset_id = ?1 AND path = ?2",
      &[SqlValue::Text(dataset_id.to_string()), SqlValue::Text(path.to_string())],
    )?;
    Ok(row.map(|r| row_to_file(&r)))
  }

  /// Resolves a file by its project-scoped absolute path; the lookup the
  /// atomic updater performs first (spec §4.5 step 1), keyed by
  /// `project_id` rather than `dataset_id` since the updater is only ever
  /// handed a project and an absolute path.
  pub fn get_file_by_project_and_path(&self, project_id: ProjectId, path: &str) -> Result<Option<File>> {
    let row = self.fetch_one(
      "SELECT * FROM files WHERE project_id = ?1 AND path = ?2",
      &[SqlValue::Text(project_id.to_string()), SqlValue::Text(path.to_string())],
    )?;
    Ok(row.map(|r| row_to_file(&r)))
  }

  pub fn mark_file_deleted(&self, id: FileId) -> Result<()> {
    self.execute("UPDATE files SET deleted = 1 WHERE id = ?1", &[SqlValue::Integer(id.0)])?;
    Ok(())
  }

  pub fn mark_file_needs_chunking(&self, id: FileId) -> Result<()> {
    self.execute("UPDATE files SET needs_chunking = 1 WHERE id = ?1", &[SqlValue::Integer(id.0)])?;
    Ok(())
  }

  pub fn files_needing_chunking(&self, project_id: ProjectId) -> Result<Vec<File>> {
    let rows = self.fetch_all(
      "SELECT * FROM files WHERE project_id = ?1 AND needs_chunking = 1 AND deleted = 0 ORDER BY id",
      &[SqlValue::Text(project_id.to_string())],
    )?;
    Ok(rows.iter().map(row_to_file).collect())
  }

  pub fn clear_file_needs_chunking(&self, id: FileId) -> Result<()> {
    self.execute("UPDATE files SET needs_chunking = 0 WHERE id = ?1", &[SqlValue::Integer(id.0)])?;
    Ok(())
  }
}

/// Fields needed to insert or update a file row. `relative_path` must
/// already be normalized project-root-relative (DESIGN.md open question
/// #3); this facade does not reach into the filesystem to compute it.
pub struct NewFile {
  pub project_id: ProjectId,
  pub dataset_id: DatasetId,
  pub watch_dir_id: Option<WatchDirId>,
  pub path: String,
  pub relative_path: String,
  pub lines: i64,
  pub last_modified: f64,
  pub has_docstring: bool,
  pub original_path: Option<String>,
  pub version_dir: Option<String>,
}

fn row_to_file(row: &Row) -> File {
  File {
    id: FileId(row.get_i64("id").unwrap()),
    project_id: ProjectId(row.get_str("project_id").unwrap().parse().unwrap()),
    dataset_id: DatasetId(row.get_str("dataset_id").unwrap().parse().unwrap()),
    watch_dir_id: row.get_str("watch_dir_id").and_then(|s| s.parse().ok()).map(WatchDirId),
    path: row.get_str("path").unwrap().to_string(),
    relative_path: row.get_str("relative_path").unwrap().to_string(),
    lines: row.get_i64("lines").unwrap_or(0),
    last_modified: row.get_f64("last_modified").unwrap_or(0.0),
    has_docstring: row.get_i64("has_docstring").unwrap_or(0) != 0,
    deleted: row.get_i64("deleted").unwrap_or(0) != 0,
    original_path: row.get_str("original_path").map(str::to_string),
    version_dir: row.get_str("version_dir").map(str::to_string),
  }
}
