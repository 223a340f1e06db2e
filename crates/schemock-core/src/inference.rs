//! The `InferenceClient` trait: a single text-completion call.

use std::future::Future;

/// A hosted language model that turns a prompt into unstructured text.
///
/// Implementations make exactly one attempt per call.
pub trait InferenceClient: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn complete<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
