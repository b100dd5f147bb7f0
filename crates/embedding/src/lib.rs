//! Embedding providers: the opaque `text -> vector` collaborator the
//! vectorization worker calls (spec §4.7). Out of scope for this engine's
//! own correctness; the worker only needs a `text -> Vec<f32>` seam it can
//! retry on transient failure.

mod error;
mod local;
mod ollama;

pub use error::EmbeddingError;
pub use local::LocalEmbedder;
pub use ollama::HttpEmbedder;

use async_trait::async_trait;

/// A provider that turns text into a fixed-dimension embedding vector.
/// Grounded on `JoeyEamigh-ccmemory`'s `embedding::EmbeddingProvider` trait,
/// trimmed to the one mode this engine needs (there is no separate
/// query/document formatting requirement in spec §4.7).
#[async_trait]
pub trait Embedder: Send + Sync {
  fn model_name(&self) -> &str;
  fn dimension(&self) -> usize;

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

  /// Default batch implementation calls `embed` sequentially; a provider
  /// with a native batch endpoint can override this for throughput. Neither
  /// provider in this crate does today; the vectorization worker only
  /// ever calls `embed` one chunk at a time (spec §4.7 step 3a).
  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut out = Vec::with_capacity(texts.len());
    for text in texts {
      out.push(self.embed(text).await?);
    }
    Ok(out)
  }
}
