use crate::ids::{
  ChunkId, ChunkUuid, ClassId, CrossRefId, CycleId, DatasetId, DuplicateId, FileId, FunctionId, ImportId, IssueId,
  MethodId, OccurrenceId, ProjectId, UsageId, VectorIndexId, WatchDirId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub id: ProjectId,
  pub root_path: String,
  pub name: String,
  pub comment: Option<String>,
  pub watch_dir_id: Option<WatchDirId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
  pub id: DatasetId,
  pub project_id: ProjectId,
  pub root_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchDir {
  pub id: WatchDirId,
  pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
  pub id: FileId,
  pub project_id: ProjectId,
  pub dataset_id: DatasetId,
  pub watch_dir_id: Option<WatchDirId>,
  pub path: String,
  /// Normalized project-root-relative path (see DESIGN.md open question #3).
  pub relative_path: String,
  pub lines: i64,
  pub last_modified: f64,
  pub has_docstring: bool,
  pub deleted: bool,
  pub original_path: Option<String>,
  pub version_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
  pub id: ClassId,
  pub file_id: FileId,
  pub name: String,
  pub line: i64,
  pub end_line: Option<i64>,
  pub docstring: Option<String>,
  /// Serialized (JSON array) list of base class names.
  pub bases: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
  pub id: MethodId,
  pub class_id: ClassId,
  pub name: String,
  pub line: i64,
  pub end_line: Option<i64>,
  /// Serialized (JSON array) argument list.
  pub args: String,
  pub docstring: Option<String>,
  pub is_abstract: bool,
  pub has_pass: bool,
  pub has_not_implemented: bool,
  pub complexity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
  pub id: FunctionId,
  pub file_id: FileId,
  pub name: String,
  pub line: i64,
  pub end_line: Option<i64>,
  pub args: String,
  pub docstring: Option<String>,
  pub complexity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
  pub id: ImportId,
  pub file_id: FileId,
  pub name: String,
  pub module: Option<String>,
  pub import_type: String,
  pub line: i64,
}

/// What an `Issue` is attached to. Exactly one variant is populated per row;
/// the enum replaces four nullable foreign-key columns with a single typed
/// tag the way `CallerRef`/`CalleeRef` do for cross-refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueTarget {
  File(FileId),
  Project(ProjectId),
  Class(ClassId),
  Method(MethodId),
  Function(FunctionId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
  pub id: IssueId,
  pub target: IssueTarget,
  pub issue_type: String,
  pub line: Option<i64>,
  pub description: String,
  /// Opaque, caller-defined JSON payload.
  pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
  pub id: UsageId,
  pub file_id: FileId,
  pub line: i64,
  pub usage_type: String,
  pub target_type: EntityKind,
  pub target_class: Option<String>,
  pub target_name: String,
  pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Class,
  Method,
  Function,
}

impl EntityKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      EntityKind::Class => "class",
      EntityKind::Method => "method",
      EntityKind::Function => "function",
    }
  }
}

impl std::str::FromStr for EntityKind {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "class" => Ok(EntityKind::Class),
      "method" => Ok(EntityKind::Method),
      "function" => Ok(EntityKind::Function),
      other => Err(crate::Error::InvalidCrossRef(format!("unknown entity kind '{other}'"))),
    }
  }
}

/// Which caller entity resolved a usage. The three nullable
/// `caller_{class,method,function}_id` columns of spec §3 collapse to one
/// variant here so "exactly one caller field is set" is a type invariant
/// rather than a runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CallerRef {
  Class(ClassId),
  Method(MethodId),
  Function(FunctionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CalleeRef {
  Class(ClassId),
  Method(MethodId),
  Function(FunctionId),
}

impl CallerRef {
  pub fn kind(&self) -> EntityKind {
    match self {
      CallerRef::Class(_) => EntityKind::Class,
      CallerRef::Method(_) => EntityKind::Method,
      CallerRef::Function(_) => EntityKind::Function,
    }
  }
}

impl CalleeRef {
  pub fn kind(&self) -> EntityKind {
    match self {
      CalleeRef::Class(_) => EntityKind::Class,
      CalleeRef::Method(_) => EntityKind::Method,
      CalleeRef::Function(_) => EntityKind::Function,
    }
  }
}

/// Reference kinds accepted by `add_entity_cross_ref` (spec §4.4). Kept open
/// (not a closed enum) because the original system treats this as an
/// extensible vocabulary; the facade validates against `KNOWN_REF_TYPES`.
pub const KNOWN_REF_TYPES: &[&str] = &["call", "inherit", "implements", "uses", "overrides", "references"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCrossRef {
  pub id: CrossRefId,
  pub caller: CallerRef,
  pub callee: CalleeRef,
  pub ref_type: String,
  pub file_id: FileId,
  pub line: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstTree {
  pub file_id: FileId,
  pub ast_hash: String,
  pub tree: String,
  pub file_mtime: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CstTree {
  pub file_id: FileId,
  pub cst_hash: String,
  pub tree: String,
  pub file_mtime: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContentOwner {
  Class(ClassId),
  Method(MethodId),
  Function(FunctionId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeContent {
  pub file_id: FileId,
  pub owner: ContentOwner,
  pub content: String,
  pub docstring: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeChunk {
  pub id: ChunkId,
  pub file_id: FileId,
  pub project_id: ProjectId,
  pub chunk_uuid: ChunkUuid,
  pub chunk_type: String,
  pub chunk_text: String,
  pub chunk_ordinal: i64,
  pub class_id: Option<ClassId>,
  pub method_id: Option<MethodId>,
  pub function_id: Option<FunctionId>,
  pub line: Option<i64>,
  pub ast_node_type: Option<String>,
  pub source_type: Option<String>,
  pub binding_level: Option<String>,
  pub vector_id: Option<i64>,
  pub embedding_model: Option<String>,
  /// JSON-serialized float array.
  pub embedding_vector: Option<String>,
  pub bm25_score: Option<f64>,
}

impl CodeChunk {
  pub fn needs_embedding(&self) -> bool {
    self.embedding_vector.is_none()
  }

  pub fn needs_vector_registration(&self) -> bool {
    self.embedding_vector.is_some() && self.vector_id.is_none()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexEntry {
  pub id: VectorIndexId,
  pub project_id: ProjectId,
  pub entity_type: EntityKind,
  pub entity_id: i64,
  pub vector_id: i64,
  pub vector_dim: i64,
  pub embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeDuplicate {
  pub id: DuplicateId,
  pub project_id: ProjectId,
  pub fingerprint: String,
  pub token_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateOccurrence {
  pub id: OccurrenceId,
  pub duplicate_id: DuplicateId,
  pub file_id: FileId,
  pub start_line: i64,
  pub end_line: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAnalysisResult {
  pub file_id: FileId,
  pub file_mtime: f64,
  pub result: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWatcherStats {
  pub cycle_id: CycleId,
  pub project_id: ProjectId,
  pub files_scanned: i64,
  pub files_changed: i64,
  pub files_deleted: i64,
  pub started_at: f64,
  pub finished_at: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizationStats {
  pub cycle_id: CycleId,
  pub project_id: ProjectId,
  pub chunks_embedded: i64,
  pub chunks_registered: i64,
  pub embedder_failures: i64,
  pub index_failures: i64,
  pub started_at: f64,
  pub finished_at: Option<f64>,
}
