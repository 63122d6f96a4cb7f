//! Chat statistics API server.
//!
//! Serves `GET /api/stats?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD` with
//! per-website chat totals aggregated from a remote raw event feed.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatstats_backend::{
    api::{build_app, StatsState},
    config::ServerConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    load_env();
    init_tracing();

    let config = ServerConfig::parse();

    let source = config
        .build_source()
        .context("Failed to initialize event source")?;
    info!(
        source = %config.source_description(),
        cache_ttl_secs = config.cache_ttl_secs,
        "Event source configured"
    );

    let app = build_app(Arc::new(StatsState::new(source)));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatstats_backend=debug,chatstats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate's own .env when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
