use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Interval, SeriesResponse};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("upstream returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("rate limited")]
    RateLimited,

    #[error("invalid response shape: {0}")]
    ShapeInvalid(String),
}

impl FetchError {
    /// Coarse failure class used in user-facing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) | FetchError::Timeout => "network",
            FetchError::Status { .. } | FetchError::RateLimited => "status",
            FetchError::ShapeInvalid(_) => "shape",
        }
    }
}

/// Source of per-symbol time series.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// The upstream `time_series` body for one symbol, after transport and
    /// status checks but before shape validation.
    async fn time_series_raw(&self, symbol: &str, interval: Interval) -> Result<Value, FetchError>;

    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<SeriesResponse, FetchError> {
        let body = self.time_series_raw(symbol, interval).await?;
        SeriesResponse::from_upstream(symbol, body)
    }
}
