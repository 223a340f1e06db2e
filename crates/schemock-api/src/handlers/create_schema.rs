//! `/create-schema`: define a schema and fill it with generated records.
//!
//! Any method (OPTIONS is answered by the CORS layer). Body:
//!
//! ```json
//! {"name": "Users", "description": "optional", "schemaDefinition": {"username": "string"}}
//! ```
//!
//! Responds `200 {"success": true, "schema": {...}, "recordCount": 10}`.

use axum::{
  extract::{Request, State},
  http::StatusCode,
  response::Response,
};
use indexmap::IndexMap;
use schemock_core::{
  inference::InferenceClient,
  schema::Schema,
  service::creation::{self, CreateSchema},
  store::SchemaStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::authenticate,
  error::ApiError,
  handlers::{IntoResponseOrErr as _, json, read_json},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaBody {
  pub name:              String,
  #[serde(default)]
  pub description:       Option<String>,
  pub schema_definition: IndexMap<String, String>,
}

impl From<CreateSchemaBody> for CreateSchema {
  fn from(b: CreateSchemaBody) -> Self {
    CreateSchema {
      name:        b.name,
      description: b.description,
      fields:      b.schema_definition,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaResponse {
  pub success:      bool,
  pub schema:       Schema,
  pub record_count: usize,
}

pub async fn handler<S, C>(
  State(state): State<AppState<S, C>>,
  req: Request,
) -> Response
where
  S: SchemaStore + 'static,
  C: InferenceClient + 'static,
{
  create(&state, req).await.into_response_or_err()
}

async fn create<S, C>(state: &AppState<S, C>, req: Request) -> Result<Response, ApiError>
where
  S: SchemaStore + 'static,
  C: InferenceClient + 'static,
{
  let (parts, body) = req.into_parts();
  let identity = authenticate(&parts.headers, state.store.as_ref()).await?;
  let body: CreateSchemaBody = read_json(body).await?;

  let created = creation::create_schema(
    state.store.as_ref(),
    state.inference.as_ref(),
    &identity,
    body.into(),
    &state.generation,
  )
  .await?;

  Ok(json(StatusCode::OK, &CreateSchemaResponse {
    success:      true,
    schema:       created.schema,
    record_count: created.record_count,
  }))
}
