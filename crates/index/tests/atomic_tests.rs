//! Scenario tests for the atomic file updater (spec §8 S3, S4).

use codestore_core::{ChunkUuid, CodeChunk, FileId};
use codestore_db::{NewFile, Store};
use codestore_index::{AtomicFileUpdater, ParseError, ParsedClass, ParsedFile, SourceParser};
use std::sync::Arc;

/// Always returns a fixed `ParsedFile`, or fails if configured to.
struct FakeParser {
  result: Result<ParsedFile, String>,
}

impl SourceParser for FakeParser {
  fn parse(&self, _source: &str) -> Result<ParsedFile, ParseError> {
    self.result.clone().map_err(ParseError)
  }
}

fn seed_file(store: &Store) -> FileId {
  let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
  let dataset = store.create_dataset(project.id, "/tmp/proj").unwrap();
  store
    .upsert_file(&NewFile {
      project_id: project.id,
      dataset_id: dataset.id,
      watch_dir_id: None,
      path: "/tmp/proj/a.py".to_string(),
      relative_path: "a.py".to_string(),
      lines: 10,
      last_modified: 0.0,
      has_docstring: false,
      original_path: None,
      version_dir: None,
    })
    .unwrap()
}

fn new_class_file() -> ParsedFile {
  ParsedFile {
    classes: vec![ParsedClass {
      name: "NewClass".to_string(),
      line: 1,
      end_line: Some(5),
      docstring: None,
      bases: "[]".to_string(),
      methods: Vec::new(),
    }],
    ast_hash: "new-ast-hash".to_string(),
    ast_tree: "{}".to_string(),
    cst_hash: "new-cst-hash".to_string(),
    cst_tree: "{}".to_string(),
    ..Default::default()
  }
}

/// S3: replacing a file whose old entities were `OldClass`/`old_fn` with one
/// containing only `NewClass` leaves `OldClass` and `old_fn` gone, `NewClass`
/// present, and any previously stored chunks cleared.
#[test]
fn s3_atomic_replace_swaps_entities_and_clears_chunks() {
  let store = Arc::new(Store::connect_in_memory().unwrap());
  let file_id = seed_file(&store);

  let old_class_id = store.insert_class(file_id, "OldClass", 1, Some(3), None, "[]").unwrap();
  store.insert_function(file_id, "old_fn", 10, Some(12), "()", None, None).unwrap();

  let project_id = store.get_file(file_id).unwrap().unwrap().project_id;
  store
    .insert_code_chunk(&CodeChunk {
      id: codestore_core::ChunkId(0),
      file_id,
      project_id,
      chunk_uuid: ChunkUuid::new(),
      chunk_type: "function".to_string(),
      chunk_text: "def old_fn(): pass".to_string(),
      chunk_ordinal: 0,
      class_id: None,
      method_id: None,
      function_id: None,
      line: Some(10),
      ast_node_type: None,
      source_type: None,
      binding_level: None,
      vector_id: None,
      embedding_model: Some("local-stub".to_string()),
      embedding_vector: Some("[0.1]".to_string()),
      bm25_score: None,
    })
    .unwrap();

  let parser = Arc::new(FakeParser { result: Ok(new_class_file()) });
  let updater = AtomicFileUpdater::new(Arc::clone(&store), parser);

  let outcome = updater.update_file_data("/tmp/proj/a.py", project_id, "/tmp/proj", "class NewClass: pass").unwrap();

  assert!(outcome.success, "expected replace to succeed: {:?}", outcome.error);
  assert!(outcome.ast_updated && outcome.cst_updated && outcome.entities_updated);

  let classes = store.classes_for_file(file_id).unwrap();
  assert_eq!(classes.len(), 1);
  assert_eq!(classes[0].name, "NewClass");
  assert_ne!(classes[0].id, old_class_id);

  assert!(store.functions_for_file(file_id).unwrap().is_empty(), "old_fn should be gone");
  assert!(
    store.get_all_chunks_for_faiss_rebuild(project_id, None).unwrap().is_empty(),
    "chunks derived from the old parse should be cleared"
  );
}

/// S4: a parser failure leaves `success = false`, a syntax-flavored error,
/// and every entity from before the attempted rewrite untouched.
#[test]
fn s4_atomic_replace_rolls_back_on_syntax_error() {
  let store = Arc::new(Store::connect_in_memory().unwrap());
  let file_id = seed_file(&store);
  store.insert_class(file_id, "OldClass", 1, Some(3), None, "[]").unwrap();
  store.insert_function(file_id, "old_fn", 10, Some(12), "()", None, None).unwrap();

  let project_id = store.get_file(file_id).unwrap().unwrap().project_id;

  let parser = Arc::new(FakeParser {
    result: Err("syntax error: unexpected indent at line 4".to_string()),
  });
  let updater = AtomicFileUpdater::new(Arc::clone(&store), parser);

  let outcome = updater.update_file_data("/tmp/proj/a.py", project_id, "/tmp/proj", "class Broken(:").unwrap();

  assert!(!outcome.success);
  assert!(outcome.file_id.is_none());
  assert!(outcome.error.as_deref().unwrap_or_default().contains("syntax error"));

  let classes = store.classes_for_file(file_id).unwrap();
  assert_eq!(classes.len(), 1);
  assert_eq!(classes[0].name, "OldClass");
  let functions = store.functions_for_file(file_id).unwrap();
  assert_eq!(functions.len(), 1);
  assert_eq!(functions[0].name, "old_fn");
}
