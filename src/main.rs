// =============================================================================
// Stock Radar — Main Entry Point
// =============================================================================
//
// Loads configuration, wires the market-data source into shared state and
// serves the analytics API until Ctrl-C.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stock_radar::api;
use stock_radar::app_state::AppState;
use stock_radar::market_data::TwelveDataProvider;
use stock_radar::runtime_config::AppConfig;

const DEFAULT_CONFIG_PATH: &str = "stock_radar.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Stock Radar starting up");

    // ── 2. Config ────────────────────────────────────────────────────────
    let config_path = std::env::var("STOCK_RADAR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = if config_path.exists() {
        AppConfig::load(&config_path)?
    } else {
        let config = AppConfig::default();
        if let Err(e) = config.save(&config_path) {
            warn!(error = %e, "failed to write default config");
        }
        config
    };
    config.apply_env_overrides();

    info!(
        symbols = ?config.symbols,
        interval = %config.provider.interval,
        "configuration ready"
    );

    // ── 3. Market data source ────────────────────────────────────────────
    let api_key = std::env::var("TWELVE_DATA_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("TWELVE_DATA_API_KEY is not set; provider requests will be rejected");
    }
    let provider = TwelveDataProvider::new(api_key, config.provider.clone())
        .context("failed to build market data client")?;

    // ── 4. API server ────────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Arc::new(provider)));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("API server failed")?;

    Ok(())
}
