//! [`SqliteStore`], the SQLite implementation of [`SchemaStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use uuid::Uuid;

use schemock_core::{
  identity::Owner,
  record::GeneratedRecord,
  schema::{NewSchema, Schema, SchemaRef},
  store::{SchemaInsert, SchemaStore},
};

use crate::{
  Result,
  encode::{
    RECORD_COLUMNS, RawOwner, RawRecord, RawSchema, SCHEMA_COLUMNS,
    encode_definition, encode_dt, encode_payload, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A schemock store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Current time at the precision stored in the database.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// `true` if `e` is the unique-constraint failure on `schemas.api_slug`.
fn is_slug_conflict(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, Some(msg))
      if err.code == rusqlite::ErrorCode::ConstraintViolation
        && msg.contains("schemas.api_slug")
  )
}

// ─── SchemaStore impl ────────────────────────────────────────────────────────

impl SchemaStore for SqliteStore {
  type Error = crate::Error;

  // ── Owners ────────────────────────────────────────────────────────────────

  async fn create_owner(
    &self,
    label: Option<String>,
    token_hash: String,
  ) -> Result<Owner> {
    let owner = Owner {
      owner_id: Uuid::new_v4(),
      label,
      created_at: now(),
    };

    let id_str = encode_uuid(owner.owner_id);
    let at_str = encode_dt(owner.created_at);
    let label  = owner.label.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO owners (owner_id, label, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, label, at_str],
        )?;
        tx.execute(
          "INSERT INTO api_tokens (token_hash, owner_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, id_str, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(owner)
  }

  async fn owner_for_token(&self, token_hash: String) -> Result<Option<Owner>> {
    let raw: Option<RawOwner> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT o.owner_id, o.label, o.created_at
             FROM api_tokens t
             JOIN owners o ON o.owner_id = t.owner_id
             WHERE t.token_hash = ?1",
            rusqlite::params![token_hash],
            |row| {
              Ok(RawOwner {
                owner_id:   row.get(0)?,
                label:      row.get(1)?,
                created_at: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOwner::into_owner).transpose()
  }

  // ── Schemas ───────────────────────────────────────────────────────────────

  async fn insert_schema_with_records(
    &self,
    input: NewSchema,
    payloads: Vec<Value>,
  ) -> Result<SchemaInsert> {
    let schema = Schema {
      id:               Uuid::new_v4(),
      owner_id:         input.owner_id,
      name:             input.name,
      description:      input.description,
      field_definition: input.field_definition,
      api_slug:         input.api_slug,
      created_at:       now(),
    };

    let id_str          = encode_uuid(schema.id);
    let owner_str       = encode_uuid(schema.owner_id);
    let name            = schema.name.clone();
    let description     = schema.description.clone();
    let definition_str  = encode_definition(&schema.field_definition)?;
    let slug            = schema.api_slug.clone();
    let at_str          = encode_dt(schema.created_at);
    let payload_strs    = payloads
      .iter()
      .map(encode_payload)
      .collect::<Result<Vec<_>>>()?;

    let inserted: Option<usize> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        match tx.execute(
          "INSERT INTO schemas (
             id, owner_id, name, description, schema_definition, api_slug, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            owner_str,
            name,
            description,
            definition_str,
            slug,
            at_str,
          ],
        ) {
          Ok(_) => {}
          // Dropping `tx` rolls back.
          Err(e) if is_slug_conflict(&e) => return Ok(None),
          Err(e) => return Err(e.into()),
        }

        {
          let mut stmt = tx.prepare(
            "INSERT INTO generated_data (id, schema_id, data, created_at)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for data in &payload_strs {
            stmt.execute(rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              id_str,
              data,
              at_str,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Some(payload_strs.len()))
      })
      .await?;

    Ok(match inserted {
      Some(record_count) => SchemaInsert::Created { schema, record_count },
      None => SchemaInsert::SlugTaken,
    })
  }

  async fn find_schema(
    &self,
    owner_id: Uuid,
    schema: SchemaRef,
  ) -> Result<Option<Schema>> {
    let owner_str = encode_uuid(owner_id);
    let (column, key) = match schema {
      SchemaRef::Id(id) => ("id", encode_uuid(id)),
      SchemaRef::Slug(slug) => ("api_slug", slug),
    };

    let raw: Option<RawSchema> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SCHEMA_COLUMNS} FROM schemas WHERE {column} = ?1 AND owner_id = ?2"
        );
        Ok(conn
          .query_row(&sql, rusqlite::params![key, owner_str], RawSchema::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawSchema::into_schema).transpose()
  }

  async fn list_schemas(&self, owner_id: Uuid) -> Result<Vec<Schema>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawSchema> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCHEMA_COLUMNS} FROM schemas
           WHERE owner_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawSchema::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSchema::into_schema).collect()
  }

  async fn delete_schema(&self, owner_id: Uuid, schema_id: Uuid) -> Result<bool> {
    let owner_str = encode_uuid(owner_id);
    let id_str    = encode_uuid(schema_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM schemas WHERE id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn list_records(&self, schema_id: Uuid) -> Result<Vec<GeneratedRecord>> {
    let schema_str = encode_uuid(schema_id);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM generated_data
           WHERE schema_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![schema_str], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get_record(
    &self,
    schema_id: Uuid,
    record_id: Uuid,
  ) -> Result<Option<GeneratedRecord>> {
    let schema_str = encode_uuid(schema_id);
    let id_str     = encode_uuid(record_id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {RECORD_COLUMNS} FROM generated_data
               WHERE id = ?1 AND schema_id = ?2"
            ),
            rusqlite::params![id_str, schema_str],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn insert_record(
    &self,
    schema_id: Uuid,
    payload: Value,
  ) -> Result<GeneratedRecord> {
    let data_str = encode_payload(&payload)?;
    let record = GeneratedRecord {
      id: Uuid::new_v4(),
      schema_id,
      payload,
      created_at: now(),
    };

    let id_str     = encode_uuid(record.id);
    let schema_str = encode_uuid(schema_id);
    let at_str     = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO generated_data (id, schema_id, data, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, schema_str, data_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn update_record(
    &self,
    schema_id: Uuid,
    record_id: Uuid,
    payload: Value,
  ) -> Result<Option<GeneratedRecord>> {
    let data_str   = encode_payload(&payload)?;
    let schema_str = encode_uuid(schema_id);
    let id_str     = encode_uuid(record_id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE generated_data SET data = ?1
               WHERE id = ?2 AND schema_id = ?3
               RETURNING {RECORD_COLUMNS}"
            ),
            rusqlite::params![data_str, id_str, schema_str],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn delete_record(&self, schema_id: Uuid, record_id: Uuid) -> Result<bool> {
    let schema_str = encode_uuid(schema_id);
    let id_str     = encode_uuid(record_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM generated_data WHERE id = ?1 AND schema_id = ?2",
          rusqlite::params![id_str, schema_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
