//! Hugging Face Inference API client implementing
//! [`schemock_core::inference::InferenceClient`].
//!
//! One POST per prompt; no retries and no streaming.

use std::time::Duration;

use reqwest::Client;
use schemock_core::inference::InferenceClient;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Connection and sampling settings for the hosted model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
  /// API token. Checked on every call, so a server without one still starts
  /// and reports the problem per request.
  pub api_key:      Option<String>,
  pub endpoint:     String,
  pub model:        String,
  pub temperature:  f32,
  pub max_tokens:   u32,
  pub timeout_secs: u64,
}

impl Default for InferenceConfig {
  fn default() -> Self {
    Self {
      api_key:      None,
      endpoint:     DEFAULT_ENDPOINT.to_owned(),
      model:        DEFAULT_MODEL.to_owned(),
      temperature:  0.7,
      max_tokens:   2048,
      timeout_secs: 120,
    }
  }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("Missing HUGGINGFACE_API_KEY")]
  MissingApiKey,

  #[error("inference request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("inference API returned {status}: {message}")]
  Api { status: u16, message: String },

  #[error("inference API returned malformed JSON: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("inference API response contained no generated text")]
  EmptyResponse,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async client for the Hugging Face text-generation endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HfInferenceClient {
  client: Client,
  config: InferenceConfig,
}

impl HfInferenceClient {
  pub fn new(config: InferenceConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &InferenceConfig { &self.config }

  fn url(&self) -> String {
    format!(
      "{}/{}",
      self.config.endpoint.trim_end_matches('/'),
      self.config.model
    )
  }

  fn request_body(&self, prompt: &str) -> Value {
    json!({
      "inputs": prompt,
      "parameters": {
        "temperature":      self.config.temperature,
        "max_new_tokens":   self.config.max_tokens,
        "return_full_text": false,
      },
    })
  }
}

impl InferenceClient for HfInferenceClient {
  type Error = Error;

  async fn complete(&self, prompt: &str) -> Result<String> {
    let api_key = self
      .config
      .api_key
      .as_deref()
      .filter(|k| !k.is_empty())
      .ok_or(Error::MissingApiKey)?;

    tracing::debug!(model = %self.config.model, "sending inference request");
    let resp = self
      .client
      .post(self.url())
      .bearer_auth(api_key)
      .json(&self.request_body(prompt))
      .send()
      .await?;

    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
      return Err(Error::Api {
        status:  status.as_u16(),
        message: failure_message(&text),
      });
    }

    extract_text(serde_json::from_str(&text)?)
  }
}

// ─── Response decoding ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Generation {
  generated_text: String,
}

fn error_message(body: &Value) -> Option<String> {
  body.get("error").and_then(Value::as_str).map(str::to_owned)
}

/// The message for a non-2xx reply: the JSON `error` field when there is
/// one, otherwise the raw body.
fn failure_message(text: &str) -> String {
  serde_json::from_str::<Value>(text)
    .ok()
    .and_then(|body| error_message(&body))
    .unwrap_or_else(|| text.trim().to_owned())
}

/// Pull the generated text out of a successful response.
///
/// The API answers with `[{"generated_text": "..."}]`; some deployments
/// return the bare object instead. An `{"error": ...}` body is an error even
/// with a 2xx status.
fn extract_text(body: Value) -> Result<String> {
  if let Some(message) = error_message(&body) {
    return Err(Error::Api { status: 200, message });
  }

  let generation = match body {
    Value::Array(items) => items.into_iter().next(),
    other @ Value::Object(_) => Some(other),
    _ => None,
  }
  .and_then(|v| serde_json::from_value::<Generation>(v).ok())
  .ok_or(Error::EmptyResponse)?;

  Ok(generation.generated_text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_text_from_array_response() {
    let body = json!([{ "generated_text": "[{\"a\":1}]" }]);
    assert_eq!(extract_text(body).unwrap(), "[{\"a\":1}]");
  }

  #[test]
  fn extracts_text_from_object_response() {
    let body = json!({ "generated_text": "hello" });
    assert_eq!(extract_text(body).unwrap(), "hello");
  }

  #[test]
  fn error_body_is_an_error() {
    let body = json!({ "error": "Model is currently loading" });
    let err = extract_text(body).unwrap_err();
    assert!(matches!(err, Error::Api { ref message, .. } if message.contains("loading")));
  }

  #[test]
  fn failure_message_prefers_the_json_error_field() {
    assert_eq!(
      failure_message(r#"{"error": "Model is overloaded"}"#),
      "Model is overloaded"
    );
  }

  #[test]
  fn failure_message_keeps_a_non_json_body() {
    let html = "<html><body>503 Service Unavailable</body></html>\n";
    assert_eq!(failure_message(html), html.trim());
  }

  #[tokio::test]
  async fn non_json_error_page_keeps_its_status() {
    use tokio::{
      io::{AsyncReadExt as _, AsyncWriteExt as _},
      net::TcpListener,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 8192];
      let _ = socket.read(&mut buf).await;
      let body = "<html>upstream unavailable</html>";
      let reply = format!(
        "HTTP/1.1 503 Service Unavailable\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
      );
      socket.write_all(reply.as_bytes()).await.unwrap();
    });

    let client = HfInferenceClient::new(InferenceConfig {
      api_key: Some("key".into()),
      endpoint: format!("http://{addr}/models"),
      ..InferenceConfig::default()
    })
    .unwrap();
    let err = client.complete("prompt").await.unwrap_err();
    assert!(
      matches!(err, Error::Api { status: 503, ref message } if message.contains("upstream unavailable")),
      "{err}"
    );
  }

  #[test]
  fn empty_array_is_empty_response() {
    assert!(matches!(extract_text(json!([])), Err(Error::EmptyResponse)));
  }

  #[test]
  fn url_joins_endpoint_and_model() {
    let client = HfInferenceClient::new(InferenceConfig {
      endpoint: "http://localhost:9000/models/".into(),
      ..InferenceConfig::default()
    })
    .unwrap();
    assert_eq!(
      client.url(),
      "http://localhost:9000/models/mistralai/Mistral-7B-Instruct-v0.3"
    );
  }

  #[test]
  fn request_body_disables_prompt_echo() {
    let client = HfInferenceClient::new(InferenceConfig::default()).unwrap();
    let body = client.request_body("go");
    assert_eq!(body["inputs"], "go");
    assert_eq!(body["parameters"]["return_full_text"], false);
    assert_eq!(body["parameters"]["max_new_tokens"], 2048);
  }

  #[tokio::test]
  async fn missing_key_fails_before_any_request() {
    let client = HfInferenceClient::new(InferenceConfig {
      endpoint: "http://127.0.0.1:9".into(),
      ..InferenceConfig::default()
    })
    .unwrap();
    let err = client.complete("prompt").await.unwrap_err();
    assert!(matches!(err, Error::MissingApiKey));
    assert_eq!(err.to_string(), "Missing HUGGINGFACE_API_KEY");
  }
}
