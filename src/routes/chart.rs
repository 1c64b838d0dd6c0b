use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ChartState, Interval, Selection};
use crate::routes::stocks::parse_interval;
use crate::services::chart_assembler::ChartError;
use crate::services::chart_cycle::load_chart;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chart", get(get_chart))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/selection", put(update_selection))
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub symbols: String,
    pub interval: Option<String>,
}

/// GET /api/chart?symbols=PFE,LLY&interval=daily
///
/// One stateless fetch cycle. Any failed symbol fails the whole chart.
async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartState>, AppError> {
    let interval = parse_interval(query.interval.as_deref(), Interval::Daily)?;
    let selection = Selection::from_csv(&query.symbols, interval);
    info!("GET /api/chart - {:?} at {}", selection.symbols, interval);

    match load_chart(state.series_provider.as_ref(), &selection, state.assembly).await {
        Ok(chart_state) => Ok(Json(chart_state)),
        Err(ChartError::NoSelection) => Ok(Json(ChartState::NoSelection)),
        Err(e) => {
            error!("Failed to build chart for {:?}: {}", selection.symbols, e);
            Err(e.into())
        }
    }
}

/// GET /api/dashboard
async fn get_dashboard(State(state): State<AppState>) -> Json<ChartState> {
    Json(state.dashboard.current())
}

/// PUT /api/dashboard/selection
///
/// Starts a new cycle in the background; any in-flight cycle is superseded.
async fn update_selection(
    State(state): State<AppState>,
    Json(selection): Json<Selection>,
) -> (StatusCode, Json<Value>) {
    let dashboard = state.dashboard.clone();
    let ticket = dashboard.begin(&selection);
    info!(
        "PUT /api/dashboard/selection - cycle {} for {:?} at {}",
        ticket.generation, selection.symbols, selection.interval
    );

    tokio::spawn(async move {
        dashboard.run(ticket, &selection).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "generation": ticket.generation })),
    )
}
