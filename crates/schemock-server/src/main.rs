//! schemock server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the schemock API under
//! `/functions/v1`.
//!
//! # Issuing a bearer token
//!
//! ```
//! cargo run -p schemock-server --bin server -- --issue-token --label alice
//! ```

mod settings;

use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use schemock_api::{AppState, auth::issue_token};
use schemock_inference::HfInferenceClient;
use schemock_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "schemock mock-data API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: std::path::PathBuf,

  /// Create a new owner, print its bearer token, and exit.
  #[arg(long)]
  issue_token: bool,

  /// Label stored with an issued token.
  #[arg(long, requires = "issue_token")]
  label: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  // Helper mode: issue a token and exit.
  if cli.issue_token {
    let (owner, token) = issue_token(&store, cli.label)
      .await
      .context("failed to issue token")?;
    println!("owner: {}", owner.owner_id);
    println!("token: {token}");
    return Ok(());
  }

  if cfg.inference.api_key.is_none() {
    tracing::warn!("no inference API key configured; schema creation will fail");
  }
  let inference = HfInferenceClient::new(cfg.inference.clone())
    .context("failed to build inference client")?;

  let state = AppState::new(Arc::new(store), Arc::new(inference), cfg.generation.clone());
  let app = Router::new()
    .nest("/functions/v1", schemock_api::router(state))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
