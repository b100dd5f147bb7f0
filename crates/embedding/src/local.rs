use crate::{EmbeddingError, Embedder};
use async_trait::async_trait;

/// A deterministic provider with no network dependency, for tests and
/// offline use, grounded on spec §8 S6's stub embedder
/// ("returning `[0.1 × 384]`"). Every call with the same text returns the
/// same vector, so golden-path tests can assert on exact values.
#[derive(Debug, Clone)]
pub struct LocalEmbedder {
  model: String,
  dimension: usize,
}

impl LocalEmbedder {
  pub fn new(dimension: usize) -> Self {
    Self {
      model: "local-stub".to_string(),
      dimension,
    }
  }

  /// Matches the literal scenario S6: 384 dimensions, every component 0.1.
  pub fn constant(dimension: usize, value: f32) -> Self {
    Self {
      model: format!("local-stub-constant-{value}"),
      dimension,
    }
  }
}

impl Default for LocalEmbedder {
  fn default() -> Self {
    Self::new(384)
  }
}

#[async_trait]
impl Embedder for LocalEmbedder {
  fn model_name(&self) -> &str {
    &self.model
  }

  fn dimension(&self) -> usize {
    self.dimension
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    if self.model.starts_with("local-stub-constant-") {
      let value: f32 = self.model.trim_start_matches("local-stub-constant-").parse().unwrap_or(0.1);
      return Ok(vec![value; self.dimension]);
    }
    // Hash-derived, so distinct texts get distinct (still deterministic)
    // vectors instead of all collapsing onto the same point.
    let seed = text.bytes().fold(1u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let base = (seed % 1000) as f32 / 1000.0;
    Ok(vec![base; self.dimension])
  }
}
