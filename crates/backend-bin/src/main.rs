// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Entry point for the todo API server.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use todo_backend_lib::{config::Settings, create_router, storage::FlatFileStorage, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Todo API server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to config/default.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    init_tracing(&settings.log_level, args.json_logs);

    let storage = FlatFileStorage::new(&settings.storage.path)
        .with_context(|| format!("failed to open storage at {}", settings.storage.path.display()))?;

    let addr = settings.bind_addr();
    let state = Arc::new(AppState::new(storage, settings)?);
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
