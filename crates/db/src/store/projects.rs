use super::Store;
use codestore_core::{DatasetId, Dataset, Project, ProjectId, Result, Row, SqlValue, WatchDir, WatchDirId};

impl Store {
  pub fn create_project(&self, root_path: &str, name: &str, comment: Option<&str>, watch_dir_id: Option<WatchDirId>) -> Result<Project> {
    let id = ProjectId::new();
    self.execute(
      "INSERT INTO projects (id, root_path, name, comment, watch_dir_id) VALUES (?1, ?2, ?3, ?4, ?5)",
      &[
        SqlValue::Text(id.to_string()),
        SqlValue::Text(root_path.to_string()),
        SqlValue::Text(name.to_string()),
        SqlValue::from(comment.map(str::to_string)),
        SqlValue::from(watch_dir_id.map(|w| w.to_string())),
      ],
    )?;
    Ok(Project {
      id,
      root_path: root_path.to_string(),
      name: name.to_string(),
      comment: comment.map(str::to_string),
      watch_dir_id,
    })
  }

  pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
    let row = self.fetch_one("SELECT * FROM projects WHERE id = ?1", &[SqlValue::Text(id.to_string())])?;
    Ok(row.map(|r| row_to_project(&r)))
  }

  pub fn list_projects(&self) -> Result<Vec<Project>> {
    let rows = self.fetch_all("SELECT * FROM projects ORDER BY name", &[])?;
    Ok(rows.iter().map(row_to_project).collect())
  }

  pub fn create_dataset(&self, project_id: ProjectId, root_path: &str) -> Result<Dataset> {
    let id = DatasetId::new();
    self.execute(
      "INSERT INTO datasets (id, project_id, root_path) VALUES (?1, ?2, ?3)",
      &[
        SqlValue::Text(id.to_string()),
        SqlValue::Text(project_id.to_string()),
        SqlValue::Text(root_path.to_string()),
      ],
    )?;
    Ok(Dataset {
      id,
      project_id,
      root_path: root_path.to_string(),
    })
  }

  pub fn get_dataset(&self, id: DatasetId) -> Result<Option<Dataset>> {
    let row = self.fetch_one("SELECT * FROM datasets WHERE id = ?1", &[SqlValue::Text(id.to_string())])?;
    Ok(row.map(|r| row_to_dataset(&r)))
  }

  pub fn create_watch_dir(&self, path: &str) -> Result<WatchDir> {
    let id = WatchDirId::new();
    self.execute(
      "INSERT INTO watch_dirs (id, path) VALUES (?1, ?2)",
      &[SqlValue::Text(id.to_string()), SqlValue::Text(path.to_string())],
    )?;
    Ok(WatchDir { id, path: path.to_string() })
  }

  pub fn get_watch_dir_by_path(&self, path: &str) -> Result<Option<WatchDir>> {
    let row = self.fetch_one("SELECT * FROM watch_dirs WHERE path = ?1", &[SqlValue::Text(path.to_string())])?;
    Ok(row.map(|r| WatchDir {
      id: WatchDirId(r.get_str("id").unwrap().parse().unwrap()),
      path: r.get_str("path").unwrap().to_string(),
    }))
  }
}

fn row_to_project(row: &Row) -> Project {
  Project {
    id: ProjectId(row.get_str("id").unwrap().parse().unwrap()),
    root_path: row.get_str("root_path").unwrap().to_string(),
    name: row.get_str("name").unwrap().to_string(),
    comment: row.get_str("comment").map(str::to_string),
    watch_dir_id: row.get_str("watch_dir_id").and_then(|s| s.parse().ok()).map(WatchDirId),
  }
}

fn row_to_dataset(row: &Row) -> Dataset {
  Dataset {
    id: DatasetId(row.get_str("id").unwrap().parse().unwrap()),
    project_id: ProjectId(row.get_str("project_id").unwrap().parse().unwrap()),
    root_path: row.get_str("root_path").unwrap().to_string(),
  }
}
