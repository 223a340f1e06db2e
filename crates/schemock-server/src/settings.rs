//! Server configuration: TOML file, environment, and defaults.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use schemock_core::generate::GenerationOptions;
use schemock_inference::InferenceConfig;
use serde::Deserialize;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

/// Runtime configuration, deserialised from `config.toml` and `SCHEMOCK__*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub inference:  InferenceConfig,
  pub generation: GenerationOptions,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8080,
      store_path: PathBuf::from("schemock.db"),
      inference:  InferenceConfig::default(),
      generation: GenerationOptions::default(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("SCHEMOCK")
          .prefix_separator("__")
          .separator("__"),
      )
      .build()
      .context("failed to read configuration")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    if cfg.inference.api_key.is_none() {
      cfg.inference.api_key = std::env::var(API_KEY_ENV).ok();
    }
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_to_an_empty_source() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("schemock.db"));
    assert_eq!(cfg.generation.record_count, 10);
    assert!(!cfg.generation.strict_conformance);
    assert_eq!(cfg.inference.max_tokens, 2048);
  }

  #[test]
  fn toml_overrides_nested_sections() {
    let toml = r#"
      port = 9000

      [inference]
      model = "mistralai/Mistral-7B-Instruct-v0.3"
      temperature = 0.2

      [generation]
      record_count = 25
      strict_conformance = true
    "#;
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.inference.model, "mistralai/Mistral-7B-Instruct-v0.3");
    assert!((cfg.inference.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(cfg.inference.max_tokens, 2048);
    assert_eq!(cfg.generation.record_count, 25);
    assert!(cfg.generation.strict_conformance);
  }

  #[test]
  fn tilde_is_expanded_only_as_a_prefix() {
    let plain = Path::new("data/schemock.db");
    assert_eq!(expand_tilde(plain), plain);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/schemock.db")),
        PathBuf::from(home).join("schemock.db")
      );
    }
  }
}
