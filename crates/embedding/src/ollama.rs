use crate::{EmbeddingError, Embedder};
use async_trait::async_trait;
use codestore_core::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to an Ollama-compatible `/api/embeddings` endpoint, grounded on
/// `JoeyEamigh-ccmemory`'s `embedding::ollama::OllamaProvider`, trimmed to
/// the single-request shape, since spec §4.7 only requires a `text -> vector`
/// call the worker can retry, not the teacher's batching/concurrency tuning.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
  client: reqwest::Client,
  url: String,
  model: String,
  dimension: usize,
}

impl HttpEmbedder {
  pub fn new(config: &EmbeddingConfig) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs_f64(config.request_timeout))
      .build()
      .unwrap_or_else(|_| reqwest::Client::new());

    Self {
      client,
      url: config.url.clone(),
      model: config.model.clone(),
      dimension: config.dimension,
    }
  }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
  fn model_name(&self) -> &str {
    &self.model
  }

  fn dimension(&self) -> usize {
    self.dimension
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    debug!(model = %self.model, chars = text.len(), "requesting embedding");

    let response = self
      .client
      .post(&self.url)
      .json(&EmbeddingRequest { model: &self.model, prompt: text })
      .send()
      .await
      .map_err(|e| if e.is_timeout() { EmbeddingError::Timeout } else { EmbeddingError::Request(e) })?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!(%status, "embedding provider returned an error status");
      return Err(EmbeddingError::Provider(format!("status {status}: {body}")));
    }

    let parsed: EmbeddingResponse = response.json().await?;
    Ok(parsed.embedding)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_client_with_configured_timeout() {
    let config = EmbeddingConfig {
      url: "http://localhost:11434/api/embeddings".to_string(),
      model: "nomic-embed-text".to_string(),
      dimension: 768,
      request_timeout: 5.0,
    };
    let embedder = HttpEmbedder::new(&config);
    assert_eq!(embedder.model_name(), "nomic-embed-text");
    assert_eq!(embedder.dimension(), 768);
  }
}
