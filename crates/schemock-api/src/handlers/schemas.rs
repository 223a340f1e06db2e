//! `/schemas`: list, fetch, and delete the requester's schemas.
//!
//! | Method   | Query | Success |
//! |----------|-------|---------|
//! | `GET`    | none | 200 + schemas, newest first |
//! | `GET`    | `schemaId` | 200 + schema |
//! | `DELETE` | `schemaId` | 200 `{"success": true}`; records are removed too |

use axum::{
  extract::{Request, State},
  http::StatusCode,
  response::Response,
};
use schemock_core::{
  inference::InferenceClient,
  schema::SchemaRef,
  service::{self, schemas},
  store::SchemaStore,
};

use crate::{
  AppState,
  auth::authenticate,
  error::ApiError,
  handlers::{IntoResponseOrErr as _, ScopeParams, json, success},
};

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

async fn dispatch<S, C>(state: &AppState<S, C>, req: Request) -> Result<Response, ApiError>
where
  S: SchemaStore + 'static,
  C: InferenceClient + 'static,
{
  let (parts, _body) = req.into_parts();
  let store = state.store.as_ref();

  let identity = authenticate(&parts.headers, store).await?;
  let params = ScopeParams::from_uri(&parts.uri)?;
  let schema_ref = params.schema_id().map(SchemaRef::parse);

  match (parts.method.as_str(), schema_ref) {
    ("GET", None) => {
      let list = schemas::list(store, &identity).await?;
      Ok(json(StatusCode::OK, &list))
    }
    ("GET", Some(schema_ref)) => {
      let schema = schemas::get(store, &identity, schema_ref).await?;
      Ok(json(StatusCode::OK, &schema))
    }
    ("DELETE", Some(schema_ref)) => {
      let schema = service::authorize(store, &identity, schema_ref).await?;
      schemas::delete(store, &identity, schema).await?;
      Ok(success())
    }
    ("DELETE", None) => Err(ApiError::bad_request("schemaId is required")),
    _ => Err(ApiError::MethodNotAllowed),
  }
}
