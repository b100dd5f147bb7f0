use crate::chunker::{Chunker, ChunkRequest, EntityBound, EntityBoundKind};
use crate::similarity::SimilarityIndex;
use codestore_core::{FileId, ProjectId, Result};
use codestore_db::Store;
use codestore_embedding::Embedder;
use std::sync::Arc;
use tracing::{info, warn};

/// Bounded page sizes for one vectorization cycle, matching spec §4.7's
/// "bounded page of files / bounded page of chunks" wording.
#[derive(Debug, Clone, Copy)]
pub struct VectorizationLimits {
  pub files_per_cycle: i64,
  pub chunks_per_cycle: i64,
}

impl Default for VectorizationLimits {
  fn default() -> Self {
    Self { files_per_cycle: 50, chunks_per_cycle: 200 }
  }
}

/// Long-running background worker for one `(db, project)`, per spec §4.7.
/// Every suspension point is an external call (embedder RPC, index call,
/// database call); there is no shared mutable state with other workers
/// beyond the database itself.
pub struct VectorizationWorker {
  store: Arc<Store>,
  chunker: Arc<dyn Chunker>,
  embedder: Arc<dyn Embedder>,
  index: Arc<dyn SimilarityIndex>,
  limits: VectorizationLimits,
}

#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
  pub files_chunked: i64,
  pub chunks_embedded: i64,
  pub chunks_registered: i64,
  pub embedder_failures: i64,
  pub index_failures: i64,
}

impl VectorizationWorker {
  pub fn new(store: Arc<Store>, chunker: Arc<dyn Chunker>, embedder: Arc<dyn Embedder>, index: Arc<dyn SimilarityIndex>, limits: VectorizationLimits) -> Self {
    Self { store, chunker, embedder, index, limits }
  }

  /// Runs exactly one cycle: chunk pending files, embed and register
  /// pending chunks, persist the cycle's stats. Callers drive repeated
  /// calls on `WorkerConfig.poll_interval` (spec §5's cooperative model).
  /// `dataset_id` narrows the chunk selection to one dataset within the
  /// project (spec §4.7); `None` covers the whole project.
  pub async fn run_cycle(&self, project_id: ProjectId, dataset_id: Option<&str>, started_at: f64) -> Result<CycleSummary> {
    let cycle_id = self.store.start_vectorization_cycle(project_id, started_at)?;
    let mut summary = CycleSummary::default();

    summary.files_chunked = self.chunk_pending_files(project_id)?;

    let chunks = self.store.get_non_vectorized_chunks(project_id, dataset_id, self.limits.chunks_per_cycle)?;
    for chunk in chunks {
      let embedding = if chunk.needs_embedding() {
        match self.embedder.embed(&chunk.chunk_text).await {
          Ok(vector) => {
            let json = serde_json::to_string(&vector).unwrap_or_default();
            if let Err(e) = self.store.set_chunk_embedding(chunk.id, self.embedder.model_name(), &json) {
              warn!(chunk_id = chunk.id.0, error = %e, "failed to persist embedding, retrying next cycle");
              continue;
            }
            summary.chunks_embedded += 1;
            vector
          }
          Err(e) => {
            warn!(chunk_id = chunk.id.0, error = %e, "embedder failed, retrying next cycle");
            summary.embedder_failures += 1;
            continue;
          }
        }
      } else {
        parse_embedding(&chunk)
      };

      let vector_id = self.index.add_vector(&embedding);
      if let Err(e) = self.store.set_chunk_vector_id(chunk.id, vector_id) {
        warn!(chunk_id = chunk.id.0, error = %e, "failed to write back vector_id; index position orphaned");
        summary.index_failures += 1;
        continue;
      }
      summary.chunks_registered += 1;
    }

    if let Err(e) = self.index.save_index() {
      warn!(error = %e, "failed to persist similarity index");
    }

    self.store.record_vectorization_progress(
      cycle_id,
      summary.chunks_embedded,
      summary.chunks_registered,
      summary.embedder_failures,
      summary.index_failures,
    )?;
    self.store.finish_vectorization_cycle(cycle_id, started_at)?;

    info!(
      files_chunked = summary.files_chunked,
      chunks_embedded = summary.chunks_embedded,
      chunks_registered = summary.chunks_registered,
      "vectorization cycle complete"
    );
    Ok(summary)
  }

  fn chunk_pending_files(&self, project_id: ProjectId) -> Result<i64> {
    let files = self.store.files_needing_chunking(project_id)?;
    let mut chunked = 0i64;

    for file in files.into_iter().take(self.limits.files_per_cycle as usize) {
      match self.chunk_one_file(project_id, file.id, &file.path) {
        Ok(()) => {
          self.store.clear_file_needs_chunking(file.id)?;
          chunked += 1;
        }
        Err(e) => warn!(file_id = file.id.0, error = %e, "chunking failed, file remains marked needs_chunking"),
      }
    }

    Ok(chunked)
  }

  fn chunk_one_file(&self, project_id: ProjectId, file_id: FileId, path: &str) -> Result<()> {
    let source = std::fs::read_to_string(path).map_err(codestore_core::Error::Io)?;
    let entities = self.entity_bounds(file_id)?;

    let request = ChunkRequest { file_id, project_id, source: &source, entities: &entities };
    for chunk in self.chunker.chunk(request) {
      self.store.insert_code_chunk(&chunk)?;
    }
    Ok(())
  }

  fn entity_bounds(&self, file_id: FileId) -> Result<Vec<EntityBound>> {
    let mut bounds = Vec::new();
    for class in self.store.classes_for_file(file_id)? {
      bounds.push(EntityBound {
        kind: EntityBoundKind::Class(class.id),
        start_line: class.line,
        end_line: class.end_line.unwrap_or(class.line),
      });
      for method in self.store.methods_for_class(class.id)? {
        bounds.push(EntityBound {
          kind: EntityBoundKind::Method(method.id),
          start_line: method.line,
          end_line: method.end_line.unwrap_or(method.line),
        });
      }
    }
    for function in self.store.functions_for_file(file_id)? {
      bounds.push(EntityBound {
        kind: EntityBoundKind::Function(function.id),
        start_line: function.line,
        end_line: function.end_line.unwrap_or(function.line),
      });
    }
    Ok(bounds)
  }
}

/// A chunk in `get_non_vectorized_chunks` always has `embedding_vector`
/// set by the time this runs (either already, or just persisted above);
/// falls back to an empty vector only if the JSON is somehow malformed,
/// which `add_vector` tolerates as a zero-length embedding.
fn parse_embedding(chunk: &codestore_core::CodeChunk) -> Vec<f32> {
  chunk
    .embedding_vector
    .as_deref()
    .and_then(|json| serde_json::from_str(json).ok())
    .unwrap_or_default()
}
