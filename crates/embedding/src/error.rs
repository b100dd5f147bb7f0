use thiserror::Error;

/// Maps to spec §7's `EmbedderError`, tolerated per-chunk by the
/// vectorization worker rather than propagated.
#[derive(Debug, Error)]
pub enum EmbeddingError {
  #[error("embedding request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("embedding provider returned an unexpected response: {0}")]
  Provider(String),

  #[error("embedding request timed out")]
  Timeout,
}
