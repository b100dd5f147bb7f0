//! Project config loading; reads `codestore.toml` into the typed
//! `codestore_core::Config`, the way `crates/core/src/config.rs` expects it
//! to be loaded (spec §6), with an `anyhow::Context` wrapper since this is
//! the binary's top-level error boundary.

use anyhow::{Context, Result};
use codestore_core::Config;
use std::path::Path;

pub fn load_config(path: &Path) -> Result<Config> {
  let contents = std::fs::read_to_string(path).with_context(|| format!("reading config file {}", path.display()))?;
  Config::from_toml_str(&contents).with_context(|| format!("parsing config file {}", path.display()))
}
