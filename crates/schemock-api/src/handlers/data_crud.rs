//! `/data-crud`: record CRUD scoped to one owned schema.
//!
//! | Method   | Query | Success | Notes |
//! |----------|-------|---------|-------|
//! | `GET`    | `schemaId` | 200 + records, newest first | |
//! | `GET`    | `schemaId&dataId` | 200 + record | |
//! | `POST`   | `schemaId` | 201 + record | Body: `{"data": ...}` |
//! | `PUT`    | `schemaId&dataId` | 200 + record | Body: `{"data": ...}`, full replace |
//! | `DELETE` | `schemaId&dataId` | 200 `{"success": true}` | |
//!
//! `schemaId` accepts a schema UUID or its `api_endpoint` slug. The schema is
//! resolved and ownership checked before the method is dispatched.

use axum::{
  extract::{Request, State},
  http::StatusCode,
  response::Response,
};
use schemock_core::{
  Error,
  inference::InferenceClient,
  schema::SchemaRef,
  service::{self, records},
  store::SchemaStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::authenticate,
  error::ApiError,
  handlers::{IntoResponseOrErr as _, ScopeParams, json, read_json, success},
};

/// Body of `POST` and `PUT`.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub data: serde_json::Value,
}

pub async fn handler<S, C>(
  State(state): State<AppState<S, C>>,
  req: Request,
) -> Response
where
  S: SchemaStore + 'static,
  C: InferenceClient + 'static,
{
  dispatch(&state, req).await.into_response_or_err()
}

/// An unparseable `dataId` cannot name a record in any schema.
fn parse_data_id(value: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(value).map_err(|_| Error::RecordNotFound.into())
}

async fn dispatch<S, C>(state: &AppState<S, C>, req: Request) -> Result<Response, ApiError>
where
  S: SchemaStore + 'static,
  C: InferenceClient + 'static,
{
  let (parts, body) = req.into_parts();
  let store = state.store.as_ref();

  let identity = authenticate(&parts.headers, store).await?;
  let params = ScopeParams::from_uri(&parts.uri)?;
  let schema_id = params
    .schema_id()
    .ok_or_else(|| ApiError::bad_request("schemaId is required"))?;
  let schema = service::authorize(store, &identity, SchemaRef::parse(schema_id)).await?;

  match parts.method.as_str() {
    "GET"    => match params.data_id() {
      Some(data_id) => {
        let record = records::get(store, &schema, parse_data_id(data_id)?).await?;
        Ok(json(StatusCode::OK, &record))
      }
      None => {
        let list = records::list(store, &schema).await?;
        Ok(json(StatusCode::OK, &list))
      }
    },
    "POST"   => {
      let RecordBody { data } = read_json(body).await?;
      let record = records::create(store, &schema, data).await?;
      Ok(json(StatusCode::CREATED, &record))
    }
    "PUT"    => {
      let data_id = params
        .data_id()
        .ok_or_else(|| ApiError::bad_request("dataId is required for updates"))?;
      let data_id = parse_data_id(data_id)?;
      let RecordBody { data } = read_json(body).await?;
      let record = records::update(store, &schema, data_id, data).await?;
      Ok(json(StatusCode::OK, &record))
    }
    "DELETE" => {
      let data_id = params
        .data_id()
        .ok_or_else(|| ApiError::bad_request("dataId is required for deletion"))?;
      records::delete(store, &schema, parse_data_id(data_id)?).await?;
      Ok(success())
    }
    _ => Err(ApiError::MethodNotAllowed),
  }
}
