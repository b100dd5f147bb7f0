use serde::{Deserialize, Serialize};

/// How a `Store` reaches the database: directly in this process, or by
/// proxying commands to a worker process that exclusively owns the file
/// (spec §9 redesign flag: a typed enum instead of a free-form option dict
/// keyed by a `driver_type` string).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverConfig {
  InProcess {
    path: String,
    backup_dir: Option<String>,
  },
  Proxy {
    path: String,
    backup_dir: Option<String>,
    #[serde(default = "default_command_timeout")]
    command_timeout: f64,
    #[serde(default = "default_poll_interval")]
    poll_interval: f64,
  },
}

impl DriverConfig {
  pub fn path(&self) -> &str {
    match self {
      DriverConfig::InProcess { path, .. } => path,
      DriverConfig::Proxy { path, .. } => path,
    }
  }

  pub fn backup_dir(&self) -> Option<&str> {
    match self {
      DriverConfig::InProcess { backup_dir, .. } => backup_dir.as_deref(),
      DriverConfig::Proxy { backup_dir, .. } => backup_dir.as_deref(),
    }
  }

  pub fn is_proxy(&self) -> bool {
    matches!(self, DriverConfig::Proxy { .. })
  }
}

fn default_command_timeout() -> f64 {
  30.0
}

fn default_poll_interval() -> f64 {
  0.1
}

/// Tuning for the vectorization worker loop (spec §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
  #[serde(default = "default_save_interval_cycles")]
  pub save_interval_cycles: u32,
  #[serde(default = "default_poll_interval")]
  pub poll_interval: f64,
}

impl Default for WorkerConfig {
  fn default() -> Self {
    Self {
      batch_size: default_batch_size(),
      save_interval_cycles: default_save_interval_cycles(),
      poll_interval: default_poll_interval(),
    }
  }
}

fn default_batch_size() -> usize {
  32
}

fn default_save_interval_cycles() -> u32 {
  10
}

/// Which embedding provider to reach for, and how (spec §4.7 /
/// `original_source`'s embedder config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
  #[serde(default = "default_embedding_url")]
  pub url: String,
  #[serde(default = "default_embedding_model")]
  pub model: String,
  #[serde(default = "default_embedding_dim")]
  pub dimension: usize,
  #[serde(default = "default_request_timeout")]
  pub request_timeout: f64,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      url: default_embedding_url(),
      model: default_embedding_model(),
      dimension: default_embedding_dim(),
      request_timeout: default_request_timeout(),
    }
  }
}

fn default_embedding_url() -> String {
  "http://localhost:11434/api/embeddings".to_string()
}

fn default_embedding_model() -> String {
  "nomic-embed-text".to_string()
}

fn default_embedding_dim() -> usize {
  768
}

fn default_request_timeout() -> f64 {
  30.0
}

/// Top-level, file-loaded configuration (spec §6). Mirrors the teacher's
/// layered config: defaults baked into each section, overridden by whatever
/// the project's `codestore.toml` sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
  pub driver: DriverConfig,
  #[serde(default)]
  pub worker: WorkerConfig,
  #[serde(default)]
  pub embedding: EmbeddingConfig,
}

impl Config {
  pub fn from_toml_str(s: &str) -> crate::Result<Self> {
    toml::from_str(s).map_err(|e| crate::Error::Config(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_in_process_driver() {
    let toml = r#"
      [driver]
      type = "in_process"
      path = "/tmp/codestore.db"
    "#;
    let config = Config::from_toml_str(toml).unwrap();
    assert_eq!(config.driver.path(), "/tmp/codestore.db");
    assert!(!config.driver.is_proxy());
    assert_eq!(config.worker.batch_size, 32);
  }

  #[test]
  fn parses_proxy_driver_with_defaults() {
    let toml = r#"
      [driver]
      type = "proxy"
      path = "/tmp/codestore.db"
    "#;
    let config = Config::from_toml_str(toml).unwrap();
    match config.driver {
      DriverConfig::Proxy {
        command_timeout, poll_interval, ..
      } => {
        assert_eq!(command_timeout, 30.0);
        assert_eq!(poll_interval, 0.1);
      }
      _ => panic!("expected proxy driver"),
    }
  }
}
