//! Owners and resolved request identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A principal that can own schemas. Credentials are stored separately as
/// token hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub owner_id:   Uuid,
  pub label:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// The authenticated requester, passed explicitly into every service call.
///
/// Only produced by resolving a bearer credential against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
  pub owner_id: Uuid,
}

impl From<&Owner> for Identity {
  fn from(owner: &Owner) -> Self { Self { owner_id: owner.owner_id } }
}
