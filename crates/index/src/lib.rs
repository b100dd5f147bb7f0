//! Everything that turns a parsed source file into stored, searchable,
//! embedded artifacts: the atomic file updater (spec §4.5), the
//! cross-reference builder (spec §4.6), and the vectorization worker loop
//! (spec §4.7), plus the chunker and similarity-index seams they depend on.

mod atomic;
mod chunker;
mod cross_ref;
mod parser;
mod similarity;
mod vectorization;

pub use atomic::{AtomicFileUpdater, FileUpdateOutcome};
pub use chunker::{compute_content_hash, ChunkRequest, Chunker, ChunkerConfig, EntityBound, EntityBoundKind, WhitespaceChunker};
pub use cross_ref::CrossRefBuilder;
pub use parser::{ParseError, ParsedClass, ParsedFile, ParsedFunction, ParsedImport, ParsedMethod, ParsedUsage, SourceParser};
pub use similarity::{InMemorySimilarityIndex, SimilarityIndex};
pub use vectorization::{CycleSummary, VectorizationLimits, VectorizationWorker};
