//! Eco-Score Pipeline — Binary Entrypoint
//! Boots the Axum HTTP server: tracing, reference data, scoring config,
//! routes, and the Prometheus exposition endpoint.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eco_score_pipeline::api::{create_router, AppState};
use eco_score_pipeline::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("eco_score_pipeline=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // ECO_DATASET_PATH / ECO_SCORING_CONFIG_PATH / ECO_PORT from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Configuration errors are fatal here, before the listener opens.
    let state = AppState::bootstrap()?;

    let metrics = Metrics::init(state.datasets.versions().len());
    let router = create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("ECO_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "eco-score pipeline listening");

    axum::serve(listener, router).await?;
    Ok(())
}
