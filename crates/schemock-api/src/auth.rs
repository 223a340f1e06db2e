//! Bearer-token authentication.
//!
//! Tokens are 32 random bytes, URL-safe base64 encoded. The store only ever
//! sees the SHA-256 hex digest of a token.

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use rand_core::{OsRng, RngCore as _};
use schemock_core::{
  Error, identity::{Identity, Owner}, store::SchemaStore,
};
use sha2::{Digest as _, Sha256};

const TOKEN_BYTES: usize = 32;

/// Generate a fresh bearer token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// The digest under which a token is stored.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the request's bearer credential to an [`Identity`].
///
/// A missing or malformed header fails without touching the store.
pub async fn authenticate<S: SchemaStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Identity, Error> {
  let token = bearer_token(headers).ok_or(Error::Unauthorized)?;
  let owner = store
    .owner_for_token(hash_token(token))
    .await
    .map_err(Error::persistence)?
    .ok_or(Error::Unauthorized)?;
  Ok(Identity::from(&owner))
}

/// Create a new owner and return it with its plaintext token.
///
/// The token is not recoverable afterwards.
pub async fn issue_token<S: SchemaStore>(
  store: &S,
  label: Option<String>,
) -> Result<(Owner, String), S::Error> {
  let token = generate_token();
  let owner = store.create_owner(label, hash_token(&token)).await?;
  tracing::info!(owner = %owner.owner_id, "issued api token");
  Ok((owner, token))
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn tokens_are_random_and_url_safe() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
  }

  #[test]
  fn hash_is_stable_sha256_hex() {
    assert_eq!(
      hash_token("abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn bearer_token_parsing() {
    assert_eq!(bearer_token(&headers("Bearer tok")), Some("tok"));
    assert_eq!(bearer_token(&headers("bearer  tok ")), Some("tok"));
    assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer_token(&headers("Bearer ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
