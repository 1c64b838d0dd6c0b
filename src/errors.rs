use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::external::series_provider::FetchError;
use crate::services::chart_assembler::ChartError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("{0}")]
    External(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
        };

        let mut headers = HeaderMap::new();
        if matches!(self, AppError::RateLimited) {
            headers.insert("Retry-After", HeaderValue::from_static("60"));
        }

        let message = match &self {
            AppError::Validation(msg) | AppError::External(msg) => msg.clone(),
            AppError::RateLimited => self.to_string(),
        };

        (status, headers, Json(json!({ "error": message }))).into_response()
    }
}

impl From<FetchError> for AppError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::RateLimited => AppError::RateLimited,
            other => AppError::External(format!("Failed to fetch stock data: {}", other)),
        }
    }
}

impl From<ChartError> for AppError {
    fn from(value: ChartError) -> Self {
        AppError::External(value.to_string())
    }
}
