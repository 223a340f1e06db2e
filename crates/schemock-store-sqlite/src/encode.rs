//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed number of
//! fractional digits, so that lexical order in SQL equals chronological
//! order. UUIDs are stored as hyphenated lowercase strings. Field
//! definitions and payloads are stored as compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use schemock_core::{
  identity::Owner,
  record::GeneratedRecord,
  schema::{FieldDefinition, Schema},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_definition(def: &FieldDefinition) -> Result<String> {
  Ok(serde_json::to_string(def)?)
}

pub fn encode_payload(payload: &serde_json::Value) -> Result<String> {
  Ok(serde_json::to_string(payload)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSchema::from_row`].
pub const SCHEMA_COLUMNS: &str =
  "id, owner_id, name, description, schema_definition, api_slug, created_at";

/// Raw strings read directly from a `schemas` row.
pub struct RawSchema {
  pub id:                String,
  pub owner_id:          String,
  pub name:              String,
  pub description:       Option<String>,
  pub schema_definition: String,
  pub api_slug:          String,
  pub created_at:        String,
}

impl RawSchema {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      owner_id:          row.get(1)?,
      name:              row.get(2)?,
      description:       row.get(3)?,
      schema_definition: row.get(4)?,
      api_slug:          row.get(5)?,
      created_at:        row.get(6)?,
    })
  }

  pub fn into_schema(self) -> Result<Schema> {
    Ok(Schema {
      id:               decode_uuid(&self.id)?,
      owner_id:         decode_uuid(&self.owner_id)?,
      name:             self.name,
      description:      self.description,
      field_definition: serde_json::from_str(&self.schema_definition)?,
      api_slug:         self.api_slug,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawRecord::from_row`].
pub const RECORD_COLUMNS: &str = "id, schema_id, data, created_at";

/// Raw strings read directly from a `generated_data` row.
pub struct RawRecord {
  pub id:         String,
  pub schema_id:  String,
  pub data:       String,
  pub created_at: String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      schema_id:  row.get(1)?,
      data:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<GeneratedRecord> {
    Ok(GeneratedRecord {
      id:         decode_uuid(&self.id)?,
      schema_id:  decode_uuid(&self.schema_id)?,
      payload:    serde_json::from_str(&self.data)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `owners` row.
pub struct RawOwner {
  pub owner_id:   String,
  pub label:      Option<String>,
  pub created_at: String,
}

impl RawOwner {
  pub fn into_owner(self) -> Result<Owner> {
    Ok(Owner {
      owner_id:   decode_uuid(&self.owner_id)?,
      label:      self.label,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = a + Duration::microseconds(1);
    let c = a + Duration::milliseconds(120);
    let encoded = [encode_dt(a), encode_dt(b), encode_dt(c)];
    let mut sorted = encoded.clone();
    sorted.sort();
    assert_eq!(encoded, sorted);
    assert_eq!(decode_dt(&encoded[1]).unwrap(), b);
  }
}
