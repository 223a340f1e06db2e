//! Generated records, the rows served by the CRUD surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One record belonging to a schema.
///
/// The payload is opaque: it is stored and returned exactly as received,
/// whether it came from the model or from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecord {
  pub id:         Uuid,
  pub schema_id:  Uuid,
  #[serde(rename = "data")]
  pub payload:    serde_json::Value,
  pub created_at: DateTime<Utc>,
}
