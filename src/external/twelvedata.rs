use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::TwelveDataSettings;
use crate::external::series_provider::{FetchError, SeriesProvider};
use crate::models::Interval;

pub struct TwelveDataProvider {
    client: reqwest::Client,
    settings: TwelveDataSettings,
}

impl TwelveDataProvider {
    pub fn new(settings: TwelveDataSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    fn time_series_url(&self) -> String {
        format!("{}/time_series", self.settings.base_url.trim_end_matches('/'))
    }

    fn query_params(&self, symbol: &str, interval: Interval) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", symbol.to_string()),
            ("interval", interval.upstream_token().to_string()),
            ("outputsize", self.settings.outputsize.to_string()),
            ("country", self.settings.country.clone()),
            ("exchange", self.settings.exchange.clone()),
            ("type", "stock".to_string()),
            ("format", "JSON".to_string()),
            ("apikey", self.settings.api_key.clone()),
        ]
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Twelve Data reports most failures as HTTP 200 with `"status": "error"`.
fn check_api_status(body: &Value) -> Result<(), FetchError> {
    if body.get("status").and_then(Value::as_str) != Some("error") {
        return Ok(());
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("API returned status: error")
        .to_string();

    if message.contains("API rate limit") || message.contains("credits") {
        return Err(FetchError::RateLimited);
    }

    let code = body
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
        .unwrap_or(400);

    Err(FetchError::Status { code, message })
}

#[async_trait]
impl SeriesProvider for TwelveDataProvider {
    async fn time_series_raw(&self, symbol: &str, interval: Interval) -> Result<Value, FetchError> {
        debug!("Requesting {} {} from Twelve Data", symbol, interval.upstream_token());

        let resp = self
            .client
            .get(self.time_series_url())
            .query(&self.query_params(symbol, interval))
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(FetchError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::ShapeInvalid(format!("body is not valid JSON: {}", e))
            }
        })?;

        check_api_status(&body)?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn provider() -> TwelveDataProvider {
        TwelveDataProvider::new(TwelveDataSettings {
            api_key: "demo".into(),
            base_url: "https://api.twelvedata.com/".into(),
            outputsize: 30,
            exchange: "NYSE".into(),
            country: "US".into(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_query_params_use_interval_token() {
        let provider = provider();
        let params = provider.query_params("PFE", Interval::Monthly);

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("symbol"), Some("PFE"));
        assert_eq!(get("interval"), Some("1month"));
        assert_eq!(get("outputsize"), Some("30"));
        assert_eq!(get("exchange"), Some("NYSE"));
        assert_eq!(get("type"), Some("stock"));
        assert_eq!(get("start_date"), None);
    }

    #[test]
    fn test_url_tolerates_trailing_slash() {
        assert_eq!(
            provider().time_series_url(),
            "https://api.twelvedata.com/time_series"
        );
    }

    #[test]
    fn test_ok_body_passes_status_check() {
        assert!(check_api_status(&json!({ "status": "ok", "values": [] })).is_ok());
        assert!(check_api_status(&json!({ "values": [] })).is_ok());
    }

    #[test]
    fn test_error_body_maps_to_status() {
        let err = check_api_status(&json!({
            "code": 404,
            "message": "**symbol** not found: FOO",
            "status": "error"
        }))
        .unwrap_err();

        assert_eq!(
            err,
            FetchError::Status {
                code: 404,
                message: "**symbol** not found: FOO".into()
            }
        );
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_rate_limit_body_maps_to_rate_limited() {
        let err = check_api_status(&json!({
            "code": 429,
            "message": "You have run out of API credits for the current minute.",
            "status": "error"
        }))
        .unwrap_err();
        assert_eq!(err, FetchError::RateLimited);
    }
}
