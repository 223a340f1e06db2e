//! The `SchemaStore` trait.
//!
//! Implemented by storage backends (e.g. `schemock-store-sqlite`). The
//! services in [`crate::service`] and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use serde_json::Value;
use uuid::Uuid;

use crate::{
  identity::Owner,
  record::GeneratedRecord,
  schema::{NewSchema, Schema, SchemaRef},
};

/// Outcome of [`SchemaStore::insert_schema_with_records`].
#[derive(Debug, Clone)]
pub enum SchemaInsert {
  Created { schema: Schema, record_count: usize },
  /// Another schema already holds the requested `api_slug`; nothing was
  /// written.
  SlugTaken,
}

/// Abstraction over a schemock storage backend.
///
/// Record methods are always scoped by `schema_id`: a record is never
/// visible, mutable, or deletable through a schema it does not belong to.
/// Ownership of the schema itself is checked by the caller via
/// [`SchemaStore::find_schema`].
pub trait SchemaStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Owners ────────────────────────────────────────────────────────────

  /// Create an owner and register the hash of its bearer token.
  fn create_owner(
    &self,
    label: Option<String>,
    token_hash: String,
  ) -> impl Future<Output = Result<Owner, Self::Error>> + Send + '_;

  /// Resolve a token hash to its owner. Returns `None` for unknown tokens.
  fn owner_for_token(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<Option<Owner>, Self::Error>> + Send + '_;

  // ── Schemas ───────────────────────────────────────────────────────────

  /// Persist a schema and one record per payload in a single transaction.
  ///
  /// Either everything is written or nothing is.
  fn insert_schema_with_records(
    &self,
    schema: NewSchema,
    payloads: Vec<Value>,
  ) -> impl Future<Output = Result<SchemaInsert, Self::Error>> + Send + '_;

  /// Look up a schema by id or slug, restricted to `owner_id`.
  fn find_schema(
    &self,
    owner_id: Uuid,
    schema: SchemaRef,
  ) -> impl Future<Output = Result<Option<Schema>, Self::Error>> + Send + '_;

  /// All schemas of `owner_id`, newest first.
  fn list_schemas(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Schema>, Self::Error>> + Send + '_;

  /// Delete a schema and, by cascade, its records. Returns `false` if no
  /// schema with that id belongs to `owner_id`.
  fn delete_schema(
    &self,
    owner_id: Uuid,
    schema_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Records ───────────────────────────────────────────────────────────

  /// All records of a schema, newest `created_at` first.
  fn list_records(
    &self,
    schema_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GeneratedRecord>, Self::Error>> + Send + '_;

  fn get_record(
    &self,
    schema_id: Uuid,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<GeneratedRecord>, Self::Error>> + Send + '_;

  /// Store a new record. The id and `created_at` are assigned by the store.
  fn insert_record(
    &self,
    schema_id: Uuid,
    payload: Value,
  ) -> impl Future<Output = Result<GeneratedRecord, Self::Error>> + Send + '_;

  /// Replace a record's payload. Returns `None` if the record does not exist
  /// in this schema.
  fn update_record(
    &self,
    schema_id: Uuid,
    record_id: Uuid,
    payload: Value,
  ) -> impl Future<Output = Result<Option<GeneratedRecord>, Self::Error>> + Send + '_;

  /// Returns `false` if the record does not exist in this schema.
  fn delete_record(
    &self,
    schema_id: Uuid,
    record_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
