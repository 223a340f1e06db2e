//! Core types, traits, and services for schemock.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::SchemaStore`]; model backends implement
//! [`inference::InferenceClient`]; the HTTP layer calls into [`service`].

// Trait methods declare `Send` futures explicitly; implementors use `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod generate;
pub mod identity;
pub mod inference;
pub mod record;
pub mod schema;
pub mod service;
pub mod store;

pub use error::{BoxError, Error, Result};
