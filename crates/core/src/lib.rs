//! Shared domain model, error taxonomy, and configuration types for the
//! codestore persistence engine. No I/O lives here; every other crate in the
//! workspace builds on top of these types.

mod config;
mod error;
mod ids;
mod model;
mod row;
mod schema;

pub use config::{Config, DriverConfig, EmbeddingConfig, WorkerConfig};
pub use error::{Error, Result};
pub use ids::{
  ChunkId, ChunkUuid, ClassId, CrossRefId, CycleId, DatasetId, DuplicateId, FileId, FunctionId, ImportId, IssueId,
  MethodId, OccurrenceId, ProjectId, UsageId, VectorIndexId, WatchDirId,
};
pub use model::{
  AstTree, CalleeRef, CallerRef, Class, CodeChunk, CodeContent, CodeDuplicate, ComprehensiveAnalysisResult, ContentOwner,
  CstTree, Dataset, DuplicateOccurrence, EntityCrossRef, EntityKind, File, FileWatcherStats, Function, Import, Issue,
  IssueTarget, KNOWN_REF_TYPES, Method, Project, Usage, VectorIndexEntry, VectorizationStats, WatchDir,
};
pub use row::{Row, SqlValue};
pub use schema::{
  ColumnDef, ColumnInfo, ForeignKey, IndexDef, Schema, SchemaDiff, SchemaSyncResult, Table, TableDiff, UniqueConstraint,
  VirtualTable, SCHEMA_VERSION,
};
