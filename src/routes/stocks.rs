use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::series_provider::FetchError;
use crate::models::Interval;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stocks", get(list_stocks))
        .route("/stock", get(get_stock))
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
}

pub(crate) fn parse_interval(raw: Option<&str>, default: Interval) -> Result<Interval, AppError> {
    match raw {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.parse().map_err(AppError::Validation),
    }
}

/// GET /api/stocks
async fn list_stocks(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dashboard_symbols.as_ref().clone())
}

/// GET /api/stock?symbol=PFE&interval=monthly
///
/// Upstream body passthrough for a single symbol.
async fn get_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Value>, AppError> {
    let symbol = query
        .symbol
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "PFE".to_string());
    let interval = parse_interval(query.interval.as_deref(), Interval::Monthly)?;

    info!("GET /api/stock - {} at {}", symbol, interval);
    let body = state
        .series_provider
        .time_series_raw(&symbol, interval)
        .await
        .map_err(|e| {
            match &e {
                FetchError::RateLimited => warn!("Rate limited when fetching {}", symbol),
                _ => error!("Failed to fetch stock data for {}: {}", symbol, e),
            }
            AppError::from(e)
        })?;

    Ok(Json(body))
}
