//! CRUD over the records of an owned schema.
//!
//! | Operation | Missing record |
//! |-----------|----------------|
//! | [`list`]   | n/a |
//! | [`get`]    | [`Error::RecordNotFound`] |
//! | [`create`] | n/a |
//! | [`update`] | [`Error::RecordNotFound`] |
//! | [`delete`] | [`Error::RecordNotFound`] |
//!
//! A record id from another schema is treated exactly like a missing one.

use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result, record::GeneratedRecord, service::OwnedSchema,
  store::SchemaStore,
};

/// Records of `schema`, newest first.
pub async fn list<S: SchemaStore>(
  store: &S,
  schema: &OwnedSchema,
) -> Result<Vec<GeneratedRecord>> {
  store
    .list_records(schema.schema().id)
    .await
    .map_err(Error::persistence)
}

pub async fn get<S: SchemaStore>(
  store: &S,
  schema: &OwnedSchema,
  record_id: Uuid,
) -> Result<GeneratedRecord> {
  store
    .get_record(schema.schema().id, record_id)
    .await
    .map_err(Error::persistence)?
    .ok_or(Error::RecordNotFound)
}

/// Store `payload` as a new record. Not idempotent.
pub async fn create<S: SchemaStore>(
  store: &S,
  schema: &OwnedSchema,
  payload: Value,
) -> Result<GeneratedRecord> {
  let record = store
    .insert_record(schema.schema().id, payload)
    .await
    .map_err(Error::persistence)?;
  tracing::debug!(schema = %record.schema_id, record = %record.id, "created record");
  Ok(record)
}

/// Replace the whole payload of a record.
pub async fn update<S: SchemaStore>(
  store: &S,
  schema: &OwnedSchema,
  record_id: Uuid,
  payload: Value,
) -> Result<GeneratedRecord> {
  store
    .update_record(schema.schema().id, record_id, payload)
    .await
    .map_err(Error::persistence)?
    .ok_or(Error::RecordNotFound)
}

pub async fn delete<S: SchemaStore>(
  store: &S,
  schema: &OwnedSchema,
  record_id: Uuid,
) -> Result<()> {
  let deleted = store
    .delete_record(schema.schema().id, record_id)
    .await
    .map_err(Error::persistence)?;
  if !deleted {
    return Err(Error::RecordNotFound);
  }
  tracing::debug!(schema = %schema.schema().id, record = %record_id, "deleted record");
  Ok(())
}
