//! Scenario test for the vectorization worker cycle (spec §8 S6).

use codestore_core::{ChunkUuid, CodeChunk};
use codestore_db::{NewFile, Store};
use codestore_embedding::LocalEmbedder;
use codestore_index::{InMemorySimilarityIndex, VectorizationLimits, VectorizationWorker, WhitespaceChunker};
use std::sync::Arc;

/// A stub embedder returning `[0.1; 384]` and a stub index handing out
/// monotonically increasing positions, run over a single chunk with no
/// embedding yet: the chunk ends up with both `embedding_vector` and
/// `vector_id` set, and no longer shows up in the next page of pending work.
#[tokio::test]
async fn s6_vectorization_cycle_embeds_and_registers_one_chunk() {
  let store = Arc::new(Store::connect_in_memory().unwrap());

  let project = store.create_project("/tmp/proj", "proj", None, None).unwrap();
  let dataset = store.create_dataset(project.id, "/tmp/proj").unwrap();
  let file_id = store
    .upsert_file(&NewFile {
      project_id: project.id,
      dataset_id: dataset.id,
      watch_dir_id: None,
      path: "/tmp/proj/a.py".to_string(),
      relative_path: "a.py".to_string(),
      lines: 3,
      last_modified: 0.0,
      has_docstring: false,
      original_path: None,
      version_dir: None,
    })
    .unwrap();
  store.clear_file_needs_chunking(file_id).unwrap();

  store
    .insert_code_chunk(&CodeChunk {
      id: codestore_core::ChunkId(0),
      file_id,
      project_id: project.id,
      chunk_uuid: ChunkUuid::new(),
      chunk_type: "function".to_string(),
      chunk_text: "def f(): return 1".to_string(),
      chunk_ordinal: 0,
      class_id: None,
      method_id: None,
      function_id: None,
      line: Some(1),
      ast_node_type: None,
      source_type: None,
      binding_level: None,
      vector_id: None,
      embedding_model: None,
      embedding_vector: None,
      bm25_score: None,
    })
    .unwrap();

  let worker = VectorizationWorker::new(
    Arc::clone(&store),
    Arc::new(WhitespaceChunker::default()),
    Arc::new(LocalEmbedder::constant(384, 0.1)),
    Arc::new(InMemorySimilarityIndex::new()),
    VectorizationLimits::default(),
  );

  let summary = worker.run_cycle(project.id, None, 0.0).await.unwrap();

  assert_eq!(summary.files_chunked, 0);
  assert_eq!(summary.chunks_embedded, 1);
  assert_eq!(summary.chunks_registered, 1);
  assert_eq!(summary.embedder_failures, 0);
  assert_eq!(summary.index_failures, 0);

  assert!(store.get_non_vectorized_chunks(project.id, None, 10).unwrap().is_empty());

  let chunks = store.get_all_chunks_for_faiss_rebuild(project.id, None).unwrap();
  assert_eq!(chunks.len(), 1);
  let chunk = &chunks[0];
  assert_eq!(chunk.vector_id, Some(0));
  assert_eq!(chunk.embedding_model.as_deref(), Some("local-stub-constant-0.1"));
  let embedding: Vec<f32> = serde_json::from_str(chunk.embedding_vector.as_deref().unwrap()).unwrap();
  assert_eq!(embedding.len(), 384);
  assert!(embedding.iter().all(|&v| (v - 0.1).abs() < f32::EPSILON));
}
