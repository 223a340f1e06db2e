//! Error types for `schemock-core`.

use thiserror::Error;

/// A boxed error from a storage backend or inference client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  InvalidInput(String),

  #[error("Schema not found")]
  SchemaNotFound,

  #[error("Record not found")]
  RecordNotFound,

  /// The model's output did not parse as JSON. `raw` is the text after
  /// fence stripping, kept for diagnostics.
  #[error("Model returned invalid JSON format")]
  GenerationFormat { raw: String },

  #[error("AI did not generate valid data array")]
  GenerationEmpty,

  #[error("generated record {index} does not match the schema: {reason}")]
  NonConforming { index: usize, reason: String },

  #[error("{0}")]
  Inference(#[source] BoxError),

  #[error("{0}")]
  Persistence(#[source] BoxError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn persistence(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Persistence(Box::new(e))
  }

  pub fn inference(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Inference(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
