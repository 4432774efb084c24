use std::net::SocketAddr;

use reach_server::engine::Engine;
use reach_server::planner::SearchConfig;
use reach_server::web::{AppState, create_router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(message) = run().await {
        error!("{message}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let data_dir = std::env::var("REACH_DATA_DIR")
        .map_err(|_| "REACH_DATA_DIR must name the dataset directory".to_string())?;
    let addr: SocketAddr = std::env::var("REACH_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .map_err(|e| format!("invalid REACH_BIND_ADDR: {e}"))?;

    // Loading and indexing is CPU-bound.
    let engine = tokio::task::spawn_blocking(move || Engine::load(&data_dir, SearchConfig::default()))
        .await
        .map_err(|e| format!("loader task failed: {e}"))?
        .map_err(|e| format!("failed to load schedule: {e}"))?;

    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    info!(%addr, "reachability server listening");
    info!("  GET /health");
    info!("  GET /search?origin=&date=&start=&end=[&max_duration=][&max_transfers=]");
    info!("  GET /stations/:external_id");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}
