//! Curation REST server
//!
//! Serves the read-only criteria API over HTTP.
//!
//! Usage:
//!   curation-server --bind 127.0.0.1:8080 --seed dataset.json

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use curation_api::{build_router, AppState, Database, Dataset, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    let filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("curation-server v{} starting", env!("CARGO_PKG_VERSION"));
    let limits = config.limits();
    limits.validate().context("invalid page size limits")?;

    let db = match &config.seed {
        Some(path) => {
            info!("Loading dataset from {}", path.display());
            Dataset::from_path(path)
                .and_then(Dataset::into_database)
                .with_context(|| format!("failed to load dataset {}", path.display()))?
        }
        None => {
            info!("No dataset given, starting empty");
            Database::new()
        }
    };

    let app = build_router(Arc::new(AppState::new(db, limits)));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await
        .context("HTTP server failed")?;

    info!("Shut down");
    Ok(())
}
