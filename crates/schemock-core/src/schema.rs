//! Schema types: the user-defined shape that generated records follow.
//!
//! A schema is written once, at creation time, and never updated. Its
//! `api_slug` is derived from the name when the schema is created and stays
//! fixed for the schema's lifetime.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Field types ─────────────────────────────────────────────────────────────

/// The closed set of type tags a schema field may carry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
  String,
  Number,
  Boolean,
  Email,
  Url,
  Date,
  Phone,
  Address,
}

// ─── Field definition ────────────────────────────────────────────────────────

/// Ordered mapping of field name to type tag.
///
/// Order is significant: the definition is embedded verbatim in the
/// generation prompt, so it round-trips through storage unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDefinition(IndexMap<String, FieldType>);

impl FieldDefinition {
  /// Build a definition from the untyped `name -> tag` map a client sends.
  ///
  /// Entries whose name is blank are dropped. At least one entry must remain
  /// and every tag must name a known [`FieldType`].
  pub fn from_raw(raw: IndexMap<String, String>) -> Result<Self> {
    let mut fields = IndexMap::with_capacity(raw.len());
    for (name, tag) in raw {
      if name.trim().is_empty() {
        continue;
      }
      let ty = FieldType::from_str(tag.trim()).map_err(|_| {
        Error::InvalidInput(format!(
          "unknown field type {tag:?} for field {name:?}"
        ))
      })?;
      fields.insert(name, ty);
    }

    if fields.is_empty() {
      return Err(Error::InvalidInput(
        "At least one field is required".to_owned(),
      ));
    }
    Ok(Self(fields))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, name: &str) -> Option<FieldType> { self.0.get(name).copied() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
    self.0.iter().map(|(k, v)| (k.as_str(), *v))
  }
}

impl FromIterator<(String, FieldType)> for FieldDefinition {
  fn from_iter<T: IntoIterator<Item = (String, FieldType)>>(iter: T) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// A persisted schema. Serialised with the column names the presentation
/// layer reads (`user_id`, `schema_definition`, `api_endpoint`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
  pub id:               Uuid,
  #[serde(rename = "user_id")]
  pub owner_id:         Uuid,
  pub name:             String,
  pub description:      Option<String>,
  #[serde(rename = "schema_definition")]
  pub field_definition: FieldDefinition,
  #[serde(rename = "api_endpoint")]
  pub api_slug:         String,
  /// Server-assigned; never changes after creation.
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::SchemaStore::insert_schema_with_records`].
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSchema {
  pub owner_id:         Uuid,
  pub name:             String,
  pub description:      Option<String>,
  pub field_definition: FieldDefinition,
  pub api_slug:         String,
}

// ─── SchemaRef ───────────────────────────────────────────────────────────────

/// How a request names a schema: by UUID or by its `api_slug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
  Id(Uuid),
  Slug(String),
}

impl SchemaRef {
  /// Interpret a `schemaId` query value. Anything that parses as a UUID is
  /// an id; everything else is treated as a slug.
  pub fn parse(value: &str) -> Self {
    let value = value.trim();
    match Uuid::parse_str(value) {
      Ok(id) => Self::Id(id),
      Err(_) => Self::Slug(value.to_owned()),
    }
  }
}

impl From<Uuid> for SchemaRef {
  fn from(id: Uuid) -> Self { Self::Id(id) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect()
  }

  #[test]
  fn from_raw_keeps_order_and_drops_blank_names() {
    let def = FieldDefinition::from_raw(raw(&[
      ("username", "string"),
      ("  ", "number"),
      ("age", "number"),
      ("contact", "email"),
    ]))
    .unwrap();

    let names: Vec<_> = def.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["username", "age", "contact"]);
    assert_eq!(def.get("contact"), Some(FieldType::Email));
  }

  #[test]
  fn from_raw_rejects_unknown_type() {
    let err = FieldDefinition::from_raw(raw(&[("x", "integer")])).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(m) if m.contains("integer")));
  }

  #[test]
  fn from_raw_requires_a_named_field() {
    let err = FieldDefinition::from_raw(raw(&[("", "string")])).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }

  #[test]
  fn field_names_are_case_sensitive() {
    let def =
      FieldDefinition::from_raw(raw(&[("Name", "string"), ("name", "string")]))
        .unwrap();
    assert_eq!(def.len(), 2);
  }

  #[test]
  fn definition_serialises_as_ordered_object() {
    let def = FieldDefinition::from_raw(raw(&[
      ("zeta", "boolean"),
      ("alpha", "date"),
    ]))
    .unwrap();
    let json = serde_json::to_string(&def).unwrap();
    assert_eq!(json, r#"{"zeta":"boolean","alpha":"date"}"#);
  }

  #[test]
  fn schema_ref_parses_uuid_or_slug() {
    let id = Uuid::new_v4();
    assert_eq!(SchemaRef::parse(&id.to_string()), SchemaRef::Id(id));
    assert_eq!(
      SchemaRef::parse("users-1700000000000"),
      SchemaRef::Slug("users-1700000000000".into())
    );
  }
}
