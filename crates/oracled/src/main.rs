//! Password Quality Oracle daemon (`oracled`)
//!
//! Serves `available`/`entropy`/`all`/`add` under a configurable URL
//! prefix, backed by a deprecating Bloom sketch and an optional n-gram
//! language model.
//!
//! Default bind: 0.0.0.0:8000
//! REST API: {path}available.json, {path}entropy.json, {path}all.json, {path}add

mod api;
mod config;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, OracleConfig};
use oracle_core::{persistence, Oracle};
use state::{AppState, NGRAM_LEN};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,oracled=debug")))
        .init();

    let config = OracleConfig::from_env_and_cli(Cli::parse());

    info!("Starting password quality oracle daemon (oracled)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let sketch = persistence::load_sketch(
        Path::new(&config.bloom_filter),
        config.slots,
        config.items,
        config.per_item,
    )
    .context("sketch parameters are invalid")?;

    let model = config
        .language_model
        .as_ref()
        .and_then(|path| persistence::load_language_model(Path::new(path)));
    if config.language_model.is_some() && model.is_none() {
        tracing::warn!(
            path = ?config.language_model,
            "configured language model could not be loaded; entropy queries will respond 503"
        );
    }

    let oracle = Oracle::new(sketch, model, NGRAM_LEN);
    let state = AppState::new(oracle, config.clone());

    let bind_addr = config.bind_addr();
    info!("Binding to {}", bind_addr);

    let app = api::create_router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("oracled listening on http://{}", bind_addr);
    info!("Serving {}available.json, {0}entropy.json, {0}all.json, {0}add", config.normalized_path());
    info!("Swagger UI: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    save_sketch_final(&state.oracle, &config).await;

    info!("oracled shut down cleanly");
    Ok(())
}

/// Resolves once on Ctrl-C or SIGTERM, whichever comes first. Runs no work
/// beyond raising the shutdown flag axum's graceful shutdown watches for;
/// the actual final persistence happens in `main` after `serve` returns
/// (spec.md §9 "do not perform arbitrary work inside the signal handler").
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining in-flight requests");
}

async fn save_sketch_final(oracle: &Arc<RwLock<Oracle>>, config: &OracleConfig) {
    let guard = oracle.read().await;
    match persistence::save_sketch(guard.sketch(), Path::new(&config.bloom_filter)) {
        Ok(()) => info!("sketch persisted to {}", config.bloom_filter),
        Err(err) => tracing::warn!(error = %err, "failed to persist sketch on shutdown"),
    }
}
