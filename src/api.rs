use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::enrich::providers::PricePoint;
use crate::enrich::UnavailableReason;
use crate::history::{HistoryEntry, ScanHistory};
use crate::scan::{ScanReport, Scanner};

/// Default chart window for a pick (three months).
const DEFAULT_CHART_DAYS: u32 = 90;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    pub history: Arc<ScanHistory>,
}

impl AppState {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
            history: Arc::new(ScanHistory::with_capacity(500)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/scan", post(run_scan))
        .route("/picks", get(last_picks))
        .route("/history", get(scan_history))
        .route("/chart/{symbol}", get(chart))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn run_scan(State(state): State<AppState>) -> Json<ScanReport> {
    let report = state.scanner.run_once().await;
    state.history.push(&report);
    Json(report)
}

async fn last_picks(State(state): State<AppState>) -> Json<Option<ScanReport>> {
    Json(state.history.last_report())
}

#[derive(serde::Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    n: Option<usize>,
}

async fn scan_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(q.n.unwrap_or(10)))
}

#[derive(serde::Deserialize)]
struct ChartQuery {
    #[serde(default)]
    days: Option<u32>,
}

#[derive(serde::Serialize)]
struct ChartOut {
    symbol: String,
    days: u32,
    points: Vec<PricePoint>,
}

async fn chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(q): Query<ChartQuery>,
) -> Result<Json<ChartOut>, (StatusCode, String)> {
    let days = q.days.unwrap_or(DEFAULT_CHART_DAYS).max(1);
    match state.scanner.price_series(&symbol, days).await {
        Ok(points) => Ok(Json(ChartOut {
            symbol,
            days,
            points,
        })),
        Err(reason) => {
            let status = match reason {
                UnavailableReason::NoData => StatusCode::NOT_FOUND,
                UnavailableReason::Timeout => StatusCode::GATEWAY_TIMEOUT,
                UnavailableReason::Fetch(_) => StatusCode::BAD_GATEWAY,
            };
            tracing::warn!(target: "api", %symbol, %reason, "chart unavailable");
            Err((status, reason.to_string()))
        }
    }
}
