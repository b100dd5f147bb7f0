use super::Store;
use codestore_core::{ClassId, FileId, FunctionId, Issue, IssueId, IssueTarget, MethodId, ProjectId, Result, Row, SqlValue};

impl Store {
  pub fn insert_issue(&self, target: IssueTarget, issue_type: &str, line: Option<i64>, description: &str, metadata: Option<serde_json::Value>) -> Result<IssueId> {
    let (kind, file_id, project_id, class_id, method_id, function_id) = match target {
      IssueTarget::File(id) => ("file", Some(id.0), None, None, None, None),
      IssueTarget::Project(id) => ("project", None, Some(id.to_string()), None, None, None),
      IssueTarget::Class(id) => ("class", None, None, Some(id.0), None, None),
      IssueTarget::Method(id) => ("method", None, None, None, Some(id.0), None),
      IssueTarget::Function(id) => ("function", None, None, None, None, Some(id.0)),
    };

    self.execute(
      "INSERT INTO issues (target_kind, target_file_id, target_project_id, target_class_id, target_method_id,
                            target_function_id, issue_type, line, description, metadata)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      &[
        SqlValue::Text(kind.to_string()),
        SqlValue::from(file_id),
        SqlValue::from(project_id),
        SqlValue::from(class_id),
        SqlValue::from(method_id),
        SqlValue::from(function_id),
        SqlValue::Text(issue_type.to_string()),
        SqlValue::from(line),
        SqlValue::Text(description.to_string()),
        SqlValue::from(metadata.map(|v| v.to_string())),
      ],
    )?;
    Ok(IssueId(self.last_insert_rowid()?))
  }

  pub fn issues_for_file(&self, file_id: FileId) -> Result<Vec<Issue>> {
    let rows = self.fetch_all(
      "SELECT * FROM issues WHERE target_kind = 'file' AND target_file_id = ?1 ORDER BY id",
      &[SqlValue::Integer(file_id.0)],
    )?;
    rows.iter().map(row_to_issue).collect()
  }
}

fn row_to_issue(row: &Row) -> Result<Issue> {
  let kind = row.get_str("target_kind").unwrap_or_default();
  let target = match kind {
    "file" => IssueTarget::File(FileId(row.get_i64("target_file_id").unwrap())),
    "project" => IssueTarget::Project(row.get_str("target_project_id").unwrap().parse().unwrap()),
    "class" => IssueTarget::Class(ClassId(row.get_i64("target_class_id").unwrap())),
    "method" => IssueTarget::Method(MethodId(row.get_i64("target_method_id").unwrap())),
    "function" => IssueTarget::Function(FunctionId(row.get_i64("target_function_id").unwrap())),
    other => return Err(codestore_core::Error::InvalidCrossRef(format!("unknown issue target kind '{other}'"))),
  };

  Ok(Issue {
    id: IssueId(row.get_i64("id").unwrap()),
    target,
    issue_type: row.get_str("issue_type").unwrap_or_default().to_string(),
    line: row.get_i64("line"),
    description: row.get_str("description").unwrap_or_default().to_string(),
    metadata: row
      .get_str("metadata")
      .and_then(|s| serde_json::from_str(s).ok()),
  })
}
