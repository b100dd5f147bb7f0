use std::sync::RwLock;

/// The external vector store collaborator the vectorization worker writes
/// to (spec §4.7). Opaque beyond `add_vector`'s monotonic integer position,
/// which becomes `CodeChunk.vector_id`; the worker never reads vectors
/// back out of the index itself.
pub trait SimilarityIndex: Send + Sync {
  fn add_vector(&self, vector: &[f32]) -> i64;
  fn save_index(&self) -> std::io::Result<()>;
  fn load_index(&self) -> std::io::Result<()>;
  fn len(&self) -> usize;
  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// An in-process index that just accumulates vectors and hands out
/// positions in insertion order, enough to satisfy the worker's contract
/// without a real ANN backend, matching spec §8 S6's "stub index returning
/// monotonically 0,1,2,…".
#[derive(Default)]
pub struct InMemorySimilarityIndex {
  vectors: RwLock<Vec<Vec<f32>>>,
}

impl InMemorySimilarityIndex {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SimilarityIndex for InMemorySimilarityIndex {
  fn add_vector(&self, vector: &[f32]) -> i64 {
    let mut vectors = self.vectors.write().expect("similarity index lock poisoned");
    vectors.push(vector.to_vec());
    (vectors.len() - 1) as i64
  }

  fn save_index(&self) -> std::io::Result<()> {
    // Nothing to persist; vectors live only for this process's lifetime.
    Ok(())
  }

  fn load_index(&self) -> std::io::Result<()> {
    Ok(())
  }

  fn len(&self) -> usize {
    self.vectors.read().expect("similarity index lock poisoned").len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn assigns_monotonically_increasing_positions() {
    let index = InMemorySimilarityIndex::new();
    assert_eq!(index.add_vector(&[0.1, 0.2]), 0);
    assert_eq!(index.add_vector(&[0.3, 0.4]), 1);
    assert_eq!(index.add_vector(&[0.5, 0.6]), 2);
    assert_eq!(index.len(), 3);
  }
}
