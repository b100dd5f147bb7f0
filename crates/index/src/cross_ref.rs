use codestore_core::{CalleeRef, CallerRef, EntityKind, FileId, ProjectId, Result};
use codestore_db::Store;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves raw usages into `EntityCrossRef` rows, per spec §4.6.
pub struct CrossRefBuilder {
  store: Arc<Store>,
}

impl CrossRefBuilder {
  pub fn new(store: Arc<Store>) -> Self {
    Self { store }
  }

  /// The candidate whose `[line, end_line]` contains `line` with the
  /// smallest span; ties broken method < function < class. A NULL
  /// `end_line` is treated as a single-line span.
  pub fn resolve_caller(&self, file_id: FileId, line: i64) -> Result<Option<(EntityKind, i64)>> {
    let spans = self.store.entity_spans_for_file(file_id)?;

    let mut best: Option<(i64, u8, EntityKind, i64)> = None;
    for span in spans {
      let end = span.end_line.unwrap_or(span.start_line);
      if span.start_line > line || end < line {
        continue;
      }
      let width = end - span.start_line;
      let rank = tie_rank(span.kind);
      let candidate = (width, rank, span.kind, span.id);
      best = Some(match best {
        Some(current) if (current.0, current.1) <= (candidate.0, candidate.1) => current,
        _ => candidate,
      });
    }

    Ok(best.map(|(_, _, kind, id)| (kind, id)))
  }

  /// Searches the whole project for the entity a usage names. Methods
  /// require `target_class`; same-file matches are preferred over other
  /// files in the project (spec §4.6).
  pub fn resolve_callee(
    &self,
    project_id: ProjectId,
    file_id: FileId,
    _line: i64,
    target_type: EntityKind,
    target_name: &str,
    target_class: Option<&str>,
  ) -> Result<Option<(EntityKind, i64)>> {
    if target_type == EntityKind::Method && target_class.is_none() {
      return Ok(None);
    }

    Ok(self
      .store
      .find_callee(project_id, file_id, target_type, target_name, target_class)?
      .map(|found| (found.kind, found.id)))
  }

  pub fn build_entity_cross_ref_for_file(&self, file_id: FileId, project_id: ProjectId) -> Result<i64> {
    let usages = self.store.raw_usages_for_file(file_id)?;
    let mut inserted = 0i64;

    for usage in usages {
      let caller = match self.resolve_caller(file_id, usage.line)? {
        Some((kind, id)) => to_caller_ref(kind, id),
        None => {
          debug!(file_id = file_id.0, line = usage.line, "no enclosing caller for usage, skipping");
          continue;
        }
      };

      let callee = match self.resolve_callee(project_id, file_id, usage.line, usage.target_type, &usage.target_name, usage.target_class.as_deref())? {
        Some((kind, id)) => to_callee_ref(kind, id),
        None => {
          debug!(file_id = file_id.0, line = usage.line, target = %usage.target_name, "unresolved callee for usage, skipping");
          continue;
        }
      };

      match self.store.insert_entity_cross_ref(caller, callee, &usage.usage_type, file_id, usage.line) {
        Ok(_) => inserted += 1,
        Err(e) => warn!(file_id = file_id.0, line = usage.line, error = %e, "failed to insert resolved cross-ref"),
      }
    }

    Ok(inserted)
  }
}

fn tie_rank(kind: EntityKind) -> u8 {
  match kind {
    EntityKind::Method => 0,
    EntityKind::Function => 1,
    EntityKind::Class => 2,
  }
}

fn to_caller_ref(kind: EntityKind, id: i64) -> CallerRef {
  match kind {
    EntityKind::Class => CallerRef::Class(codestore_core::ClassId(id)),
    EntityKind::Method => CallerRef::Method(codestore_core::MethodId(id)),
    EntityKind::Function => CallerRef::Function(codestore_core::FunctionId(id)),
  }
}

fn to_callee_ref(kind: EntityKind, id: i64) -> CalleeRef {
  match kind {
    EntityKind::Class => CalleeRef::Class(codestore_core::ClassId(id)),
    EntityKind::Method => CalleeRef::Method(codestore_core::MethodId(id)),
    EntityKind::Function => CalleeRef::Function(codestore_core::FunctionId(id)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use codestore_db::Store;

  #[test]
  fn resolves_the_smallest_enclosing_caller() {
    let store = Arc::new(Store::connect_in_memory().unwrap());
    let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
    let dataset = store.create_dataset(project.id, "/tmp/proj").unwrap();
    let file = store
      .upsert_file(&codestore_db::NewFile {
        project_id: project.id,
        dataset_id: dataset.id,
        watch_dir_id: None,
        path: "/tmp/proj/a.py".to_string(),
        relative_path: "a.py".to_string(),
        lines: 20,
        last_modified: 0.0,
        has_docstring: false,
        original_path: None,
        version_dir: None,
      })
      .unwrap();

    let class_id = store.insert_class(file, "Widget", 1, Some(20), None, "[]").unwrap();
    let method_id = store.insert_method(class_id, "render", 5, Some(10), "[]", None, false, false, false, None).unwrap();

    let builder = CrossRefBuilder::new(store.clone());
    let resolved = builder.resolve_caller(file, 7).unwrap();
    assert_eq!(resolved, Some((EntityKind::Method, method_id.0)));
  }

  #[test]
  fn resolves_a_callee_declared_in_a_different_project_file() {
    let store = Arc::new(Store::connect_in_memory().unwrap());
    let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
    let dataset = store.create_dataset(project.id, "/tmp/proj").unwrap();

    let caller_file = store
      .upsert_file(&codestore_db::NewFile {
        project_id: project.id,
        dataset_id: dataset.id,
        watch_dir_id: None,
        path: "/tmp/proj/caller.py".to_string(),
        relative_path: "caller.py".to_string(),
        lines: 5,
        last_modified: 0.0,
        has_docstring: false,
        original_path: None,
        version_dir: None,
      })
      .unwrap();
    let callee_file = store
      .upsert_file(&codestore_db::NewFile {
        project_id: project.id,
        dataset_id: dataset.id,
        watch_dir_id: None,
        path: "/tmp/proj/utils.py".to_string(),
        relative_path: "utils.py".to_string(),
        lines: 5,
        last_modified: 0.0,
        has_docstring: false,
        original_path: None,
        version_dir: None,
      })
      .unwrap();

    let function_id = store.insert_function(callee_file, "helper", 1, Some(2), "[]", None, None).unwrap();

    let builder = CrossRefBuilder::new(store.clone());
    let resolved = builder
      .resolve_callee(project.id, caller_file, 3, EntityKind::Function, "helper", None)
      .unwrap();
    assert_eq!(resolved, Some((EntityKind::Function, function_id.0)));
  }

  #[test]
  fn prefers_a_same_file_callee_over_another_file_with_the_same_name() {
    let store = Arc::new(Store::connect_in_memory().unwrap());
    let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
    let dataset = store.create_dataset(project.id, "/tmp/proj").unwrap();

    let file_a = store
      .upsert_file(&codestore_db::NewFile {
        project_id: project.id,
        dataset_id: dataset.id,
        watch_dir_id: None,
        path: "/tmp/proj/a.py".to_string(),
        relative_path: "a.py".to_string(),
        lines: 5,
        last_modified: 0.0,
        has_docstring: false,
        original_path: None,
        version_dir: None,
      })
      .unwrap();
    let file_b = store
      .upsert_file(&codestore_db::NewFile {
        project_id: project.id,
        dataset_id: dataset.id,
        watch_dir_id: None,
        path: "/tmp/proj/b.py".to_string(),
        relative_path: "b.py".to_string(),
        lines: 5,
        last_modified: 0.0,
        has_docstring: false,
        original_path: None,
        version_dir: None,
      })
      .unwrap();

    let other_file_fn = store.insert_function(file_b, "helper", 1, Some(2), "[]", None, None).unwrap();
    let same_file_fn = store.insert_function(file_a, "helper", 1, Some(2), "[]", None, None).unwrap();

    let builder = CrossRefBuilder::new(store.clone());
    let resolved = builder
      .resolve_callee(project.id, file_a, 3, EntityKind::Function, "helper", None)
      .unwrap();
    assert_eq!(resolved, Some((EntityKind::Function, same_file_fn.0)));
    assert_ne!(same_file_fn.0, other_file_fn.0);
  }
}
