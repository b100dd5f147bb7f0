use codestore_core::{ChunkUuid, ClassId, CodeChunk, FileId, FunctionId, MethodId, ProjectId};
use sha2::{Digest, Sha256};

/// Produces `CodeChunk` rows for one file's source, with no `vector_id`
/// assigned; the vectorization worker's first step delegates here (spec
/// §4.7 step 1). Grounded on the teacher's `Chunker`, trimmed to a
/// language-agnostic default since tree-sitter definitions are out of this
/// engine's scope (parsing itself is an external collaborator, spec §1).
pub trait Chunker: Send + Sync {
  fn chunk(&self, request: ChunkRequest<'_>) -> Vec<CodeChunk>;
}

/// What the chunker needs out of one file: the text, identity, and
/// (optionally) the already-parsed entity boundaries an `AtomicFileUpdater`
/// run just produced, so chunk boundaries can align with a class/method
/// instead of an arbitrary line count when that information is available.
pub struct ChunkRequest<'a> {
  pub file_id: FileId,
  pub project_id: ProjectId,
  pub source: &'a str,
  pub entities: &'a [EntityBound],
}

/// One declared entity's line span and id, used to align chunk boundaries.
#[derive(Debug, Clone, Copy)]
pub struct EntityBound {
  pub kind: EntityBoundKind,
  pub start_line: i64,
  pub end_line: i64,
}

#[derive(Debug, Clone, Copy)]
pub enum EntityBoundKind {
  Class(ClassId),
  Method(MethodId),
  Function(FunctionId),
}

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
  /// Target lines per chunk when falling back to whitespace-delimited
  /// chunking (no entity boundaries supplied, or a gap between them).
  pub target_lines: usize,
  /// Chunks below this many non-blank lines are merged into the next one,
  /// mirroring the teacher's `min_lines` to avoid single-line noise chunks.
  pub min_lines: usize,
}

impl Default for ChunkerConfig {
  fn default() -> Self {
    Self { target_lines: 50, min_lines: 5 }
  }
}

/// Chunks by declared entity when `ChunkRequest::entities` is non-empty,
/// falling back to a whitespace-paragraph heuristic (blank-line-delimited
/// runs, grouped up to `target_lines`) everywhere else.
pub struct WhitespaceChunker {
  config: ChunkerConfig,
}

impl WhitespaceChunker {
  pub fn new(config: ChunkerConfig) -> Self {
    Self { config }
  }
}

impl Default for WhitespaceChunker {
  fn default() -> Self {
    Self::new(ChunkerConfig::default())
  }
}

impl Chunker for WhitespaceChunker {
  fn chunk(&self, request: ChunkRequest<'_>) -> Vec<CodeChunk> {
    let lines: Vec<&str> = request.source.lines().collect();
    if lines.is_empty() {
      return Vec::new();
    }

    if !request.entities.is_empty() {
      return self.chunk_by_entities(&request, &lines);
    }

    self.chunk_by_paragraphs(&request, &lines)
  }
}

impl WhitespaceChunker {
  fn chunk_by_entities(&self, request: &ChunkRequest<'_>, lines: &[&str]) -> Vec<CodeChunk> {
    let mut sorted = request.entities.to_vec();
    sorted.sort_by_key(|e| e.start_line);

    let mut chunks = Vec::new();
    for (ordinal, bound) in sorted.iter().enumerate() {
      let start = (bound.start_line.max(1) - 1) as usize;
      let end = (bound.end_line.max(bound.start_line) as usize).min(lines.len());
      if start >= end {
        continue;
      }
      let text = lines[start..end].join("\n");
      chunks.push(self.build_chunk(request, &text, ordinal as i64, bound.start_line, Some(*bound)));
    }
    chunks
  }

  fn chunk_by_paragraphs(&self, request: &ChunkRequest<'_>, lines: &[&str]) -> Vec<CodeChunk> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut current_start = 1i64;
    let mut ordinal = 0i64;

    let mut flush = |current: &mut Vec<&str>, start_line: i64, chunks: &mut Vec<CodeChunk>, ordinal: &mut i64| {
      if current.is_empty() {
        return;
      }
      let text = current.join("\n");
      chunks.push(self.build_chunk(request, &text, *ordinal, start_line, None));
      *ordinal += 1;
      current.clear();
    };

    for (idx, line) in lines.iter().enumerate() {
      let line_no = idx as i64 + 1;
      if line.trim().is_empty() && current.len() >= self.config.min_lines {
        flush(&mut current, current_start, &mut chunks, &mut ordinal);
        current_start = line_no + 1;
        continue;
      }
      if current.is_empty() {
        current_start = line_no;
      }
      current.push(*line);
      if current.len() >= self.config.target_lines {
        flush(&mut current, current_start, &mut chunks, &mut ordinal);
        current_start = line_no + 1;
      }
    }
    flush(&mut current, current_start, &mut chunks, &mut ordinal);

    chunks
  }

  fn build_chunk(&self, request: &ChunkRequest<'_>, text: &str, ordinal: i64, line: i64, bound: Option<EntityBound>) -> CodeChunk {
    let (chunk_type, class_id, method_id, function_id) = match bound.map(|b| b.kind) {
      Some(EntityBoundKind::Class(id)) => ("class", Some(id), None, None),
      Some(EntityBoundKind::Method(id)) => ("method", None, Some(id), None),
      Some(EntityBoundKind::Function(id)) => ("function", None, None, Some(id)),
      None => ("paragraph", None, None, None),
    };

    CodeChunk {
      id: codestore_core::ChunkId(0),
      file_id: request.file_id,
      project_id: request.project_id,
      chunk_uuid: ChunkUuid::new(),
      chunk_type: chunk_type.to_string(),
      chunk_text: text.to_string(),
      chunk_ordinal: ordinal,
      class_id,
      method_id,
      function_id,
      line: Some(line),
      ast_node_type: None,
      source_type: Some("source".to_string()),
      binding_level: None,
      vector_id: None,
      embedding_model: None,
      embedding_vector: None,
      bm25_score: None,
    }
  }
}

/// Deterministic content hash used for `ASTTree.ast_hash` / `CSTTree.cst_hash`
/// (spec §3: "deterministic content hashes; rewriting identical content is
/// idempotent"). SHA-256 truncated to 16 hex chars, grounded on the
/// teacher's `compute_content_hash` (`crates/core/src/code.rs`); same
/// truncation, same rationale (compact storage, negligible collision risk
/// at this scale).
pub fn compute_content_hash(content: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(content.as_bytes());
  let digest = hasher.finalize();
  format!("{:016x}", u64::from_be_bytes(digest[0..8].try_into().unwrap()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use codestore_core::ProjectId;

  #[test]
  fn chunks_by_blank_line_paragraphs_when_no_entities() {
    let chunker = WhitespaceChunker::new(ChunkerConfig { target_lines: 100, min_lines: 1 });
    let source = "line one\nline two\n\nline three\nline four\n";
    let request = ChunkRequest {
      file_id: FileId(1),
      project_id: ProjectId::new(),
      source,
      entities: &[],
    };
    let chunks = chunker.chunk(request);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].chunk_text, "line one\nline two");
    assert_eq!(chunks[1].chunk_text, "line three\nline four");
  }

  #[test]
  fn content_hash_is_stable_for_identical_input() {
    assert_eq!(compute_content_hash("fn main() {}"), compute_content_hash("fn main() {}"));
    assert_ne!(compute_content_hash("fn main() {}"), compute_content_hash("fn other() {}"));
  }
}
