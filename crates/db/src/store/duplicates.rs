use super::Store;
use codestore_core::{CodeDuplicate, DuplicateId, DuplicateOccurrence, FileId, OccurrenceId, ProjectId, Result, Row, SqlValue};

impl Store {
  /// Finds an existing duplicate by fingerprint or creates one;
  /// `(project_id, fingerprint)` is unique, so repeated fingerprints from
  /// different files collapse onto the same duplicate group (spec §4.8).
  pub fn upsert_code_duplicate(&self, project_id: ProjectId, fingerprint: &str, token_count: i64) -> Result<DuplicateId> {
    if let Some(row) = self.fetch_one(
      "SELECT * FROM code_duplicates WHERE project_id = ?1 AND fingerprint = ?2",
      &[SqlValue::Text(project_id.to_string()), SqlValue::Text(fingerprint.to_string())],
    )? {
      return Ok(DuplicateId(row.get_i64("id").unwrap()));
    }

    self.execute(
      "INSERT INTO code_duplicates (project_id, fingerprint, token_count) VALUES (?1, ?2, ?3)",
      &[SqlValue::Text(project_id.to_string()), SqlValue::Text(fingerprint.to_string()), SqlValue::Integer(token_count)],
    )?;
    Ok(DuplicateId(self.last_insert_rowid()?))
  }

  pub fn insert_duplicate_occurrence(&self, duplicate_id: DuplicateId, file_id: FileId, start_line: i64, end_line: i64) -> Result<OccurrenceId> {
    self.execute(
      "INSERT INTO duplicate_occurrences (duplicate_id, file_id, start_line, end_line) VALUES (?1, ?2, ?3, ?4)",
      &[SqlValue::Integer(duplicate_id.0), SqlValue::Integer(file_id.0), SqlValue::Integer(start_line), SqlValue::Integer(end_line)],
    )?;
    Ok(OccurrenceId(self.last_insert_rowid()?))
  }

  pub fn duplicates_for_project(&self, project_id: ProjectId) -> Result<Vec<CodeDuplicate>> {
    let rows = self.fetch_all(
      "SELECT * FROM code_duplicates WHERE project_id = ?1 ORDER BY id",
      &[SqlValue::Text(project_id.to_string())],
    )?;
    rows.iter().map(row_to_duplicate).collect()
  }

  pub fn occurrences_for_duplicate(&self, duplicate_id: DuplicateId) -> Result<Vec<DuplicateOccurrence>> {
    let rows = self.fetch_all(
      "SELECT * FROM duplicate_occurrences WHERE duplicate_id = ?1 ORDER BY id",
      &[SqlValue::Integer(duplicate_id.0)],
    )?;
    rows.iter().map(row_to_occurrence).collect()
  }

  /// Drops every occurrence recorded against `file_id`, for re-scanning a
  /// changed file without leaving stale occurrence rows behind. Duplicate
  /// groups themselves are left in place even if they end up with zero
  /// occurrences; they're recreated lazily by `upsert_code_duplicate`.
  pub fn clear_duplicate_occurrences_for_file(&self, file_id: FileId) -> Result<()> {
    self.execute("DELETE FROM duplicate_occurrences WHERE file_id = ?1", &[SqlValue::Integer(file_id.0)])?;
    Ok(())
  }
}

fn row_to_duplicate(row: &Row) -> Result<CodeDuplicate> {
  Ok(CodeDuplicate {
    id: DuplicateId(row.get_i64("id").unwrap()),
    project_id: row
      .get_str("project_id")
      .unwrap()
      .parse()
      .map_err(|e: uuid::Error| codestore_core::Error::InvalidCrossRef(e.to_string()))?,
    fingerprint: row.get_str("fingerprint").unwrap_or_default().to_string(),
    token_count: row.get_i64("token_count").unwrap_or(0),
  })
}

fn row_to_occurrence(row: &Row) -> Result<DuplicateOccurrence> {
  Ok(DuplicateOccurrence {
    id: OccurrenceId(row.get_i64("id").unwrap()),
    duplicate_id: DuplicateId(row.get_i64("duplicate_id").unwrap()),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    start_line: row.get_i64("start_line").unwrap_or(0),
    end_line: row.get_i64("end_line").unwrap_or(0),
  })
}
