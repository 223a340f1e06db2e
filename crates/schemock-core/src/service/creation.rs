//! Schema creation: validate, prompt the model, decode, persist.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

use crate::{
  Error, Result,
  generate::{
    GenerationOptions, build_prompt, check_conformance, derive_slug,
    parse_generated,
  },
  identity::Identity,
  inference::InferenceClient,
  schema::{FieldDefinition, NewSchema, Schema},
  store::{SchemaInsert, SchemaStore},
};

/// How many slugs are tried before giving up on a name collision.
const SLUG_ATTEMPTS: usize = 3;

/// Input to [`create_schema`], as received from the client.
#[derive(Debug, Clone)]
pub struct CreateSchema {
  pub name:        String,
  pub description: Option<String>,
  /// Untyped `field name -> type tag` map.
  pub fields:      IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct SchemaCreated {
  pub schema:       Schema,
  pub record_count: usize,
}

/// Create a schema for `identity` and populate it with model-generated
/// records.
///
/// The model is called once. Nothing is persisted unless its output decodes
/// into a non-empty array (and, with `strict_conformance`, matches the field
/// definition). The schema and its records are then written atomically.
pub async fn create_schema<S, C>(
  store: &S,
  client: &C,
  identity: &Identity,
  request: CreateSchema,
  options: &GenerationOptions,
) -> Result<SchemaCreated>
where
  S: SchemaStore,
  C: InferenceClient,
{
  let name = request.name.trim();
  if name.is_empty() {
    return Err(Error::InvalidInput("Schema name is required".to_owned()));
  }
  let fields = FieldDefinition::from_raw(request.fields)?;
  let description = request
    .description
    .map(|d| d.trim().to_owned())
    .filter(|d| !d.is_empty());

  let mut slug_at = Utc::now();
  let mut api_slug = derive_slug(name, slug_at);

  let prompt = build_prompt(&fields, options.record_count)?;
  tracing::info!(owner = %identity.owner_id, slug = %api_slug, "calling inference model");
  let raw = client.complete(&prompt).await.map_err(Error::inference)?;

  let records = parse_generated(&raw)?;
  if options.strict_conformance {
    check_conformance(&fields, &records)?;
  }

  for _ in 0..SLUG_ATTEMPTS {
    let new_schema = NewSchema {
      owner_id:         identity.owner_id,
      name:             name.to_owned(),
      description:      description.clone(),
      field_definition: fields.clone(),
      api_slug:         api_slug.clone(),
    };

    match store
      .insert_schema_with_records(new_schema, records.clone())
      .await
      .map_err(Error::persistence)?
    {
      SchemaInsert::Created { schema, record_count } => {
        tracing::info!(
          schema = %schema.id,
          slug = %schema.api_slug,
          record_count,
          "created schema"
        );
        return Ok(SchemaCreated { schema, record_count });
      }
      SchemaInsert::SlugTaken => {
        tracing::warn!(slug = %api_slug, "api slug already taken; retrying");
        slug_at = next_slug_time(slug_at);
        api_slug = derive_slug(name, slug_at);
      }
    }
  }

  Err(Error::Persistence(
    format!("could not allocate a unique api slug for {name:?}").into(),
  ))
}

/// A timestamp strictly after `prev`, so the retried slug always differs.
fn next_slug_time(prev: DateTime<Utc>) -> DateTime<Utc> {
  Utc::now().max(prev + Duration::milliseconds(1))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn retried_slug_time_always_advances() {
    let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
    let next = next_slug_time(far_future);
    assert_eq!(next, far_future + Duration::milliseconds(1));
    assert_ne!(derive_slug("Users", far_future), derive_slug("Users", next));

    let past = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    assert!(next_slug_time(past) > past + Duration::milliseconds(1));
  }
}
