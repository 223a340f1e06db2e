//! Listing, fetching, and deleting an owner's schemas.

use crate::{
  Error, Result,
  identity::Identity,
  schema::{Schema, SchemaRef},
  service::{OwnedSchema, authorize},
  store::SchemaStore,
};

/// All schemas owned by `identity`, newest first.
pub async fn list<S: SchemaStore>(store: &S, identity: &Identity) -> Result<Vec<Schema>> {
  store
    .list_schemas(identity.owner_id)
    .await
    .map_err(Error::persistence)
}

/// A single schema of `identity`.
pub async fn get<S: SchemaStore>(
  store: &S,
  identity: &Identity,
  schema: SchemaRef,
) -> Result<Schema> {
  authorize(store, identity, schema).await.map(OwnedSchema::into_inner)
}

/// Delete an owned schema together with all of its records.
pub async fn delete<S: SchemaStore>(
  store: &S,
  identity: &Identity,
  schema: OwnedSchema,
) -> Result<()> {
  let schema = schema.into_inner();
  let deleted = store
    .delete_schema(identity.owner_id, schema.id)
    .await
    .map_err(Error::persistence)?;
  if !deleted {
    return Err(Error::SchemaNotFound);
  }
  tracing::info!(schema = %schema.id, slug = %schema.api_slug, "deleted schema");
  Ok(())
}
