//! Request-level operations composed from the store and inference traits.
//!
//! Every operation takes the requester's [`Identity`] explicitly. Schema-scoped
//! operations take an [`OwnedSchema`], which can only be obtained through
//! [`authorize`], so ownership is checked before any record is touched.

pub mod creation;
pub mod records;
pub mod schemas;

use crate::{
  Error, Result,
  identity::Identity,
  schema::{Schema, SchemaRef},
  store::SchemaStore,
};

/// A schema that has been verified to belong to the requester.
#[derive(Debug, Clone)]
pub struct OwnedSchema(Schema);

impl OwnedSchema {
  pub fn schema(&self) -> &Schema { &self.0 }

  pub fn into_inner(self) -> Schema { self.0 }
}

/// Resolve `schema` for `identity`.
///
/// Fails with [`Error::SchemaNotFound`] both when the schema does not exist
/// and when it belongs to someone else.
pub async fn authorize<S>(
  store: &S,
  identity: &Identity,
  schema: SchemaRef,
) -> Result<OwnedSchema>
where
  S: SchemaStore,
{
  store
    .find_schema(identity.owner_id, schema)
    .await
    .map_err(Error::persistence)?
    .map(OwnedSchema)
    .ok_or(Error::SchemaNotFound)
}
