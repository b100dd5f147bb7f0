use super::Store;
use codestore_core::{ChunkId, ChunkUuid, ClassId, CodeChunk, EntityKind, FileId, FunctionId, MethodId, ProjectId, Result, Row, SqlValue, VectorIndexEntry, VectorIndexId};

impl Store {
  pub fn insert_code_chunk(&self, chunk: &CodeChunk) -> Result<ChunkId> {
    self.execute(
      "INSERT INTO code_chunks
         (file_id, project_id, chunk_uuid, chunk_type, chunk_text, chunk_ordinal,
          class_id, method_id, function_id, line, ast_node_type, source_type, binding_level,
          vector_id, embedding_model, embedding_vector)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
      &[
        SqlValue::Integer(chunk.file_id.0),
        SqlValue::Text(chunk.project_id.to_string()),
        SqlValue::Text(chunk.chunk_uuid.to_string()),
        SqlValue::Text(chunk.chunk_type.clone()),
        SqlValue::Text(chunk.chunk_text.clone()),
        SqlValue::Integer(chunk.chunk_ordinal),
        SqlValue::from(chunk.class_id.map(|v| v.0)),
        SqlValue::from(chunk.method_id.map(|v| v.0)),
        SqlValue::from(chunk.function_id.map(|v| v.0)),
        SqlValue::from(chunk.line),
        SqlValue::from(chunk.ast_node_type.clone()),
        SqlValue::from(chunk.source_type.clone()),
        SqlValue::from(chunk.binding_level.clone()),
        SqlValue::from(chunk.vector_id),
        SqlValue::from(chunk.embedding_model.clone()),
        SqlValue::from(chunk.embedding_vector.clone()),
      ],
    )?;
    Ok(ChunkId(self.last_insert_rowid()?))
  }

  /// Chunks that either have no stored embedding yet (need the embed step)
  /// or have one but no `vector_id` (need the index-registration step),
  /// oldest-id-first; `get_non_vectorized_chunks` from the original facade
  /// surface, the single query the worker's main loop pages through (spec
  /// §4.7 step 2). A chunk whose `vector_id` is already set never appears
  /// here, so re-running a cycle is safe (spec §4.7 "ordering and
  /// idempotency"). `dataset_id`, when given, narrows the scan to one
  /// dataset within the project (spec §4.4/§4.7); `code_chunks` has no
  /// `dataset_id` column of its own, so this joins `files` for it.
  pub fn get_non_vectorized_chunks(&self, project_id: ProjectId, dataset_id: Option<&str>, limit: i64) -> Result<Vec<CodeChunk>> {
    let rows = match dataset_id {
      Some(dataset_id) => self.fetch_all(
        "SELECT cc.* FROM code_chunks cc JOIN files f ON cc.file_id = f.id
         WHERE cc.project_id = ?1 AND f.dataset_id = ?2 AND (cc.embedding_vector IS NULL OR cc.vector_id IS NULL)
         ORDER BY cc.id LIMIT ?3",
        &[SqlValue::Text(project_id.to_string()), SqlValue::Text(dataset_id.to_string()), SqlValue::Integer(limit)],
      )?,
      None => self.fetch_all(
        "SELECT * FROM code_chunks WHERE project_id = ?1 AND (embedding_vector IS NULL OR vector_id IS NULL) ORDER BY id LIMIT ?2",
        &[SqlValue::Text(project_id.to_string()), SqlValue::Integer(limit)],
      )?,
    };
    rows.iter().map(row_to_chunk).collect()
  }

  pub fn set_chunk_embedding(&self, chunk_id: ChunkId, model: &str, embedding_json: &str) -> Result<()> {
    self.execute(
      "UPDATE code_chunks SET embedding_model = ?2, embedding_vector = ?3 WHERE id = ?1",
      &[SqlValue::Integer(chunk_id.0), SqlValue::Text(model.to_string()), SqlValue::Text(embedding_json.to_string())],
    )?;
    Ok(())
  }

  pub fn set_chunk_vector_id(&self, chunk_id: ChunkId, vector_id: i64) -> Result<()> {
    self.execute(
      "UPDATE code_chunks SET vector_id = ?2 WHERE id = ?1",
      &[SqlValue::Integer(chunk_id.0), SqlValue::Integer(vector_id)],
    )?;
    Ok(())
  }

  /// Every chunk with an embedding, regardless of vectorization state;
  /// `get_all_chunks_for_faiss_rebuild` from the original facade, kept for
  /// an external index compactor even though compaction itself is optional
  /// (DESIGN.md open question #2). `dataset_id` narrows it to one dataset,
  /// same join as `get_non_vectorized_chunks`.
  pub fn get_all_chunks_for_faiss_rebuild(&self, project_id: ProjectId, dataset_id: Option<&str>) -> Result<Vec<CodeChunk>> {
    let rows = match dataset_id {
      Some(dataset_id) => self.fetch_all(
        "SELECT cc.* FROM code_chunks cc JOIN files f ON cc.file_id = f.id
         WHERE cc.project_id = ?1 AND f.dataset_id = ?2 AND cc.embedding_vector IS NOT NULL
         ORDER BY cc.id",
        &[SqlValue::Text(project_id.to_string()), SqlValue::Text(dataset_id.to_string())],
      )?,
      None => self.fetch_all(
        "SELECT * FROM code_chunks WHERE project_id = ?1 AND embedding_vector IS NOT NULL ORDER BY id",
        &[SqlValue::Text(project_id.to_string())],
      )?,
    };
    rows.iter().map(row_to_chunk).collect()
  }

  /// Drops every chunk derived from `file_id`, the way the atomic updater's
  /// clear step does before re-chunking (spec §4.5 step 3 / §4.7's "mark
  /// needs chunking" contract: no stale chunks survive a rewrite).
  pub fn clear_chunks_for_file(&self, file_id: FileId) -> Result<()> {
    self.execute("DELETE FROM code_chunks WHERE file_id = ?1", &[SqlValue::Integer(file_id.0)])?;
    Ok(())
  }

  pub fn insert_vector_index_entry(&self, entry: &VectorIndexEntry) -> Result<VectorIndexId> {
    self.execute(
      "INSERT INTO vector_index (project_id, entity_type, entity_id, vector_id, vector_dim, embedding_model)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      &[
        SqlValue::Text(entry.project_id.to_string()),
        SqlValue::Text(entry.entity_type.as_str().to_string()),
        SqlValue::Integer(entry.entity_id),
        SqlValue::Integer(entry.vector_id),
        SqlValue::Integer(entry.vector_dim),
        SqlValue::Text(entry.embedding_model.clone()),
      ],
    )?;
    Ok(VectorIndexId(self.last_insert_rowid()?))
  }
}

fn row_to_chunk(row: &Row) -> Result<CodeChunk> {
  Ok(CodeChunk {
    id: ChunkId(row.get_i64("id").unwrap()),
    file_id: FileId(row.get_i64("file_id").unwrap()),
    project_id: row
      .get_str("project_id")
      .unwrap()
      .parse()
      .map_err(|e: uuid::Error| codestore_core::Error::InvalidCrossRef(e.to_string()))?,
    chunk_uuid: row
      .get_str("chunk_uuid")
      .unwrap()
      .parse::<ChunkUuid>()
      .map_err(|e| codestore_core::Error::InvalidCrossRef(e.to_string()))?,
    chunk_type: row.get_str("chunk_type").unwrap_or_default().to_string(),
    chunk_text: row.get_str("chunk_text").unwrap_or_default().to_string(),
    chunk_ordinal: row.get_i64("chunk_ordinal").unwrap_or(0),
    class_id: row.get_i64("class_id").map(ClassId),
    method_id: row.get_i64("method_id").map(MethodId),
    function_id: row.get_i64("function_id").map(FunctionId),
    line: row.get_i64("line"),
    ast_node_type: row.get_str("ast_node_type").map(str::to_string),
    source_type: row.get_str("source_type").map(str::to_string),
    binding_level: row.get_str("binding_level").map(str::to_string),
    vector_id: row.get_i64("vector_id"),
    embedding_model: row.get_str("embedding_model").map(str::to_string),
    embedding_vector: row.get_str("embedding_vector").map(str::to_string),
    bm25_score: None,
  })
}
