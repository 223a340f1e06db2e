pub mod create_schema;
pub mod data_crud;
pub mod schemas;

use axum::{
  Json,
  body::Body,
  extract::Query,
  http::{StatusCode, Uri},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::error::ApiError;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// `schemaId` / `dataId` query parameters shared by the CRUD endpoints.
/// Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScopeParams {
  #[serde(rename = "schemaId")]
  schema_id: Option<String>,
  #[serde(rename = "dataId")]
  data_id:   Option<String>,
}

impl ScopeParams {
  pub(crate) fn from_uri(uri: &Uri) -> Result<Self, ApiError> {
    Query::<Self>::try_from_uri(uri)
      .map(|Query(p)| p)
      .map_err(|e| ApiError::bad_request(e.body_text()))
  }

  pub(crate) fn schema_id(&self) -> Option<&str> {
    non_empty(self.schema_id.as_deref())
  }

  pub(crate) fn data_id(&self) -> Option<&str> { non_empty(self.data_id.as_deref()) }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}

/// Read and decode a JSON request body.
pub(crate) async fn read_json<T: DeserializeOwned>(body: Body) -> Result<T, ApiError> {
  let bytes: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
    .await
    .map_err(|_| ApiError::bad_request("request body too large"))?;
  serde_json::from_slice(&bytes)
    .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}

pub(crate) fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
  (status, Json(value)).into_response()
}

pub(crate) fn success() -> Response {
  json(StatusCode::OK, &json!({ "success": true }))
}

// ─── Helper trait ────────────────────────────────────────────────────────────

pub(crate) trait IntoResponseOrErr {
  fn into_response_or_err(self) -> Response;
}

impl IntoResponseOrErr for Result<Response, ApiError> {
  fn into_response_or_err(self) -> Response {
    match self {
      Ok(r) => r,
      Err(e) => e.into_response(),
    }
  }
}
