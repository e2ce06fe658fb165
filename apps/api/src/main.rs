mod config;
mod curation;
mod errors;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::curation::relevance::KeywordRelevanceScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::DataStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Advisor API v{}", env!("CARGO_PKG_VERSION"));

    // Load catalogs and the major table (a bad major table is fatal)
    let store = tokio::task::spawn_blocking({
        let config = config.clone();
        move || DataStore::load(&config)
    })
    .await??;
    info!(
        "Data store ready: {} catalog(s), {} major(s), top {} per slot",
        store.catalogs.len(),
        store.majors.len(),
        config.recommendations_per_slot
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        store: Arc::new(store),
        scorer: Arc::new(KeywordRelevanceScorer),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
