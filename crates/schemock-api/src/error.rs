//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use schemock_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("{0}")]
  BadRequest(String),

  #[error("Method not allowed")]
  MethodNotAllowed,
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::BadRequest(message.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      ApiError::Core(e) => match e {
        CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::SchemaNotFound | CoreError::RecordNotFound => {
          StatusCode::NOT_FOUND
        }
        CoreError::GenerationFormat { .. }
        | CoreError::GenerationEmpty
        | CoreError::NonConforming { .. }
        | CoreError::Inference(_)
        | CoreError::Persistence(_)
        | CoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_the_taxonomy() {
    let cases = [
      (ApiError::from(CoreError::Unauthorized), 401),
      (ApiError::from(CoreError::InvalidInput("x".into())), 400),
      (ApiError::from(CoreError::SchemaNotFound), 404),
      (ApiError::from(CoreError::RecordNotFound), 404),
      (ApiError::MethodNotAllowed, 405),
      (ApiError::from(CoreError::GenerationEmpty), 500),
      (
        ApiError::from(CoreError::GenerationFormat { raw: "nope".into() }),
        500,
      ),
      (ApiError::from(CoreError::Persistence("disk full".into())), 500),
    ];
    for (err, code) in cases {
      assert_eq!(err.status().as_u16(), code, "{err}");
    }
  }

  #[test]
  fn messages_are_surfaced_verbatim() {
    assert_eq!(ApiError::from(CoreError::SchemaNotFound).to_string(), "Schema not found");
    assert_eq!(
      ApiError::from(CoreError::Persistence("disk full".into())).to_string(),
      "disk full"
    );
  }
}
