use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::external::series_provider::FetchError;

/// One OHLCV observation exactly as the upstream delivered it.
///
/// Prices stay as text; parsing happens when a chart is assembled so that a
/// single bad field degrades to a gap instead of failing the series. Numbers
/// are accepted in place of strings and any other JSON type becomes `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Verbatim JSON text when upstream sent something other than a string.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub datetime: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub open: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub high: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub low: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub close: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub volume: Option<String>,
}

impl RawBar {
    /// Closing price as a finite number, `None` when absent or unparseable.
    pub fn close_price(&self) -> Option<f64> {
        parse_decimal(self.close.as_deref()?)
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct UpstreamMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Validated bars for one symbol and one interval, newest-first as delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResponse {
    pub symbol: String,
    pub name: Option<String>,
    pub bars: Vec<RawBar>,
}

impl SeriesResponse {
    /// Validates an upstream `time_series` body.
    ///
    /// `symbol` is the symbol that was requested; it wins over `meta.symbol`
    /// so that outcomes stay attributable to the caller's selection.
    pub fn from_upstream(symbol: &str, body: Value) -> Result<Self, FetchError> {
        let Value::Object(mut body) = body else {
            return Err(FetchError::ShapeInvalid(
                "response body is not a JSON object".to_string(),
            ));
        };

        let values = match body.remove("values") {
            Some(Value::Array(values)) => values,
            Some(_) => {
                return Err(FetchError::ShapeInvalid(
                    "'values' is not an array".to_string(),
                ))
            }
            None => {
                return Err(FetchError::ShapeInvalid(
                    "missing 'values' in response".to_string(),
                ))
            }
        };

        let bars = values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                serde_json::from_value::<RawBar>(value).map_err(|e| {
                    FetchError::ShapeInvalid(format!("malformed bar at index {}: {}", idx, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let meta = body
            .remove("meta")
            .and_then(|m| serde_json::from_value::<UpstreamMeta>(m).ok());

        let name = meta.and_then(|meta| {
            if let Some(echoed) = meta.symbol.as_deref() {
                if !echoed.eq_ignore_ascii_case(symbol) {
                    tracing::debug!("Upstream echoed symbol {} for request {}", echoed, symbol);
                }
            }
            meta.name.filter(|n| !n.trim().is_empty())
        });

        Ok(Self {
            symbol: symbol.to_string(),
            name,
            bars,
        })
    }

    /// Bars in ascending time order. The response keeps its delivered order.
    pub fn chronological(&self) -> Vec<&RawBar> {
        self.bars.iter().rev().collect()
    }
}
