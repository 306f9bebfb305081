// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Symbols are taken from a wildcard
// segment so that pairs such as `USD/BRL` route without escaping.
//
// CORS is configured permissively; the API serves read-only analytics.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::ProviderError;
use crate::indicators::{compute_indicators, IndicatorConfig};
use crate::signals;
use crate::types::{AnnotatedBar, PriceBar};

/// Number of bars returned by the price endpoint.
const PRICE_TAIL: usize = 50;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/symbols", get(symbols))
        .route("/api/v1/price/*symbol", get(price))
        .route("/api/v1/indicators", post(indicators_from_bars))
        .route("/api/v1/indicators/*symbol", get(indicators_for_symbol))
        .route("/api/v1/signal/*symbol", get(signal))
        .route("/api/v1/realtime/*symbol", get(realtime))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        let status = match &err {
            ProviderError::EmptySeries(_) | ProviderError::Api(_) => StatusCode::NOT_FOUND,
            ProviderError::TimeRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// Health / watch list
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

async fn symbols(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.symbols.clone())
}

// =============================================================================
// Prices
// =============================================================================

async fn price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<PriceBar>>, ApiError> {
    let bars = state.history(&symbol).await.map_err(|e| {
        warn!(symbol = %symbol, error = %e, "price lookup failed");
        ApiError::from(e)
    })?;
    let start = bars.len().saturating_sub(PRICE_TAIL);
    Ok(Json(bars[start..].to_vec()))
}

async fn realtime(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<PriceBar>>, ApiError> {
    let bars = state.realtime().map_err(|e| {
        warn!(symbol = %symbol, error = %e, "realtime simulation failed");
        ApiError::from(e)
    })?;
    info!(symbol = %symbol, bars = bars.len(), "simulated realtime series served");
    Ok(Json(bars))
}

// =============================================================================
// Indicators
// =============================================================================

#[derive(Deserialize)]
struct IndicatorRequest {
    bars: Vec<PriceBar>,
    #[serde(default)]
    config: Option<IndicatorConfig>,
}

async fn indicators_from_bars(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndicatorRequest>,
) -> Result<Json<Vec<AnnotatedBar>>, ApiError> {
    let config = req.config.unwrap_or(state.config.indicators);
    config.validate().map_err(|e| ApiError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: e.to_string(),
    })?;
    Ok(Json(compute_indicators(&req.bars, &config)))
}

async fn indicators_for_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<AnnotatedBar>>, ApiError> {
    let bars = state.history(&symbol).await?;
    Ok(Json(compute_indicators(&bars, &state.config.indicators)))
}

// =============================================================================
// Signal
// =============================================================================

#[derive(Serialize)]
struct SignalResponse {
    symbol: String,
    kind: signals::SignalKind,
    price_change_pct: Option<f64>,
    message: String,
    bars: usize,
}

async fn signal(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<SignalResponse>, ApiError> {
    let bars = state.history(&symbol).await?;
    let report = signals::evaluate(&bars, &state.config.signal);

    info!(symbol = %symbol, signal = %report.kind, "signal evaluated");

    Ok(Json(SignalResponse {
        symbol,
        kind: report.kind,
        price_change_pct: report.price_change_pct,
        message: report.to_string(),
        bars: bars.len(),
    }))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::BarSource;
    use crate::runtime_config::AppConfig;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration, TimeZone, Utc};
    use tower::ServiceExt;

    /// Serves a rising series for any symbol except `MISSING`.
    struct RampSource;

    #[async_trait]
    impl BarSource for RampSource {
        async fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceBar>, ProviderError> {
            if symbol == "MISSING" {
                return Err(ProviderError::EmptySeries(symbol.to_string()));
            }
            Ok(ramp(60))
        }
    }

    fn ramp(n: usize) -> Vec<PriceBar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (1..=n)
            .map(|i| {
                let c = i as f64;
                PriceBar {
                    timestamp: t0 + Duration::days(i as i64),
                    open: c,
                    high: c + 1.0,
                    low: c,
                    close: c,
                    volume: 10.0,
                }
            })
            .collect()
    }

    fn app() -> Router {
        router(Arc::new(AppState::new(AppConfig::default(), Arc::new(RampSource))))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn price_returns_last_fifty_bars() {
        let (status, body) = get_json("/api/v1/price/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        let bars = body.as_array().unwrap();
        assert_eq!(bars.len(), 50);
        assert_eq!(bars[49]["close"], 60.0);
    }

    #[tokio::test]
    async fn price_accepts_pair_symbols() {
        let (status, _) = get_json("/api/v1/price/USD/BRL").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_symbol_is_404() {
        let (status, body) = get_json("/api/v1/price/MISSING").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("MISSING"));
    }

    #[tokio::test]
    async fn indicators_for_symbol_use_configured_windows() {
        let (status, body) = get_json("/api/v1/indicators/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        let bars = body.as_array().unwrap();
        assert_eq!(bars.len(), 60);
        assert!(bars[18]["sma_short"].is_null());
        assert_eq!(bars[19]["sma_short"], 10.5);
        assert!(bars[48]["sma_long"].is_null());
        assert_eq!(bars[49]["sma_long"], 25.5);
    }

    #[tokio::test]
    async fn signal_for_rising_series_is_uptrend() {
        let (status, body) = get_json("/api/v1/signal/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "UPTREND");
        assert_eq!(body["bars"], 60);
        assert!(body["message"].as_str().unwrap().starts_with("Uptrend"));
    }

    #[tokio::test]
    async fn realtime_serves_simulated_bars() {
        let (status, body) = get_json("/api/v1/realtime/WINFUT").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn realtime_out_of_calendar_is_500() {
        let config = AppConfig {
            realtime_bars: usize::MAX,
            ..AppConfig::default()
        };
        let app = router(Arc::new(AppState::new(config, Arc::new(RampSource))));
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/realtime/WINFUT")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn post_indicators_with_custom_windows() {
        let bars = serde_json::to_value(ramp(5)).unwrap();
        let req = serde_json::json!({ "bars": bars, "config": { "sma_short_window": 3, "sma_long_window": 4 } });
        let (status, bytes) = post_json("/api/v1/indicators", req).await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body[2]["sma_short"], 2.0);
        assert_eq!(body[4]["sma_short"], 4.0);
        assert!(body[1]["sma_short"].is_null());
    }

    #[tokio::test]
    async fn post_indicators_empty_bars() {
        let (status, bytes) = post_json("/api/v1/indicators", serde_json::json!({ "bars": [] })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"[]");
    }

    #[tokio::test]
    async fn post_indicators_rejects_zero_window() {
        let req = serde_json::json!({ "bars": [], "config": { "atr_window": 0 } });
        let (status, _) = post_json("/api/v1/indicators", req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn post_indicators_rejects_bar_without_close() {
        let req = serde_json::json!({ "bars": [
            { "timestamp": "2024-01-01T00:00:00Z", "open": 1.0, "high": 2.0, "low": 0.5 }
        ] });
        let (status, _) = post_json("/api/v1/indicators", req).await;
        assert!(status.is_client_error());
    }
}
