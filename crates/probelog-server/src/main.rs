//! probelog-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured detection store, and serves the JSON API plus the bundled
//! static UI over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use probelog_api::api_router;
use probelog_core::store::DetectionStore;
use probelog_store_memory::MemoryStore;
use probelog_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{
  cors::CorsLayer,
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Backend {
  Sqlite,
  Memory,
}

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `PROBELOG_*` environment variables. Every field has a default, so the
/// server starts with no configuration at all — a local file-backed SQLite
/// database on port 8080.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_backend")]
  backend:    Backend,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  #[serde(default = "default_ui_dir")]
  ui_dir:     PathBuf,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_backend() -> Backend { Backend::Sqlite }
fn default_store_path() -> PathBuf { PathBuf::from("fingerprinting.db") }
fn default_ui_dir() -> PathBuf { PathBuf::from("ui") }

#[derive(Parser)]
#[command(author, version, about = "Probelog detection store server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PROBELOG"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  match server_cfg.backend {
    Backend::Sqlite => {
      let store = SqliteStore::open(&server_cfg.store_path)
        .await
        .with_context(|| {
          format!("failed to open store at {:?}", server_cfg.store_path)
        })?;
      tracing::info!(
        path = %server_cfg.store_path.display(),
        "using sqlite detection store"
      );
      serve(Arc::new(store), &server_cfg).await
    }
    Backend::Memory => {
      tracing::warn!(
        "using in-memory detection store; records will not survive a restart"
      );
      serve(Arc::new(MemoryStore::new()), &server_cfg).await
    }
  }
}

/// Assemble the router and serve it until the process is terminated.
async fn serve<S>(store: Arc<S>, cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: DetectionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Unmatched paths fall through to the static UI; unknown files serve the
  // index so the popup can deep-link.
  let index = cfg.ui_dir.join("index.html");
  let static_ui = ServeDir::new(&cfg.ui_dir).fallback(ServeFile::new(index));

  let app = Router::new()
    .nest("/api", api_router(store))
    .fallback_service(static_ui)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", cfg.host, cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
