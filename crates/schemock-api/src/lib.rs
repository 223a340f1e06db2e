//! HTTP surface of schemock.
//!
//! Exposes an axum [`Router`] with three endpoints, backed by any
//! [`SchemaStore`] and [`InferenceClient`]:
//!
//! - `/create-schema`: define a schema and generate its records
//! - `/data-crud`: record CRUD within one schema
//! - `/schemas`: list, fetch, and delete schemas
//!
//! Every endpoint requires `Authorization: Bearer <token>`, except CORS
//! preflight requests which are answered by the CORS layer.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/functions/v1", schemock_api::router(state))
//! ```

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
  Router,
  http::{HeaderName, header},
  routing::any,
};
use schemock_core::{
  generate::GenerationOptions, inference::InferenceClient, store::SchemaStore,
};
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, C> {
  pub store:      Arc<S>,
  pub inference:  Arc<C>,
  pub generation: Arc<GenerationOptions>,
}

impl<S, C> AppState<S, C> {
  pub fn new(store: Arc<S>, inference: Arc<C>, generation: GenerationOptions) -> Self {
    Self { store, inference, generation: Arc::new(generation) }
  }
}

// Derived `Clone` would require `S: Clone` and `C: Clone`.
impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      inference:  Arc::clone(&self.inference),
      generation: Arc::clone(&self.generation),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Permissive CORS: any origin, and the headers browser clients send.
pub fn cors_layer() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers([
      header::AUTHORIZATION,
      HeaderName::from_static("x-client-info"),
      HeaderName::from_static("apikey"),
      header::CONTENT_TYPE,
    ])
}

/// Build the API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S, C>(state: AppState<S, C>) -> Router<()>
where
  S: SchemaStore + 'static,
  C: InferenceClient + 'static,
{
  Router::new()
    .route("/create-schema", any(handlers::create_schema::handler::<S, C>))
    .route("/data-crud", any(handlers::data_crud::handler::<S, C>))
    .route("/schemas", any(handlers::schemas::handler::<S, C>))
    .layer(cors_layer())
    .with_state(state)
}
