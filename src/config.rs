use std::time::Duration;

use anyhow::{bail, Context};

use crate::models::Selection;
use crate::services::labels::ClockStyle;

pub const DEFAULT_SYMBOLS: [&str; 5] = ["PFE", "LLY", "UNH", "JNJ", "NVO"];

pub const DEFAULT_CORS_ORIGINS: [&str; 2] = [
    "https://stocks-dashboard-coral.vercel.app",
    "http://localhost:3000",
];

/// Everything the Twelve Data client needs.
#[derive(Debug, Clone)]
pub struct TwelveDataSettings {
    pub api_key: String,
    pub base_url: String,
    pub outputsize: u32,
    pub exchange: String,
    pub country: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub twelvedata: TwelveDataSettings,
    pub cors_origins: Vec<String>,
    pub dashboard_symbols: Vec<String>,
    pub clock: ClockStyle,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env_or("PORT", "5000")
            .parse()
            .context("PORT must be a valid port number")?;

        let api_key = std::env::var("TWELVEDATA_API_KEY").context("TWELVEDATA_API_KEY not set")?;

        let outputsize = env_or("TWELVEDATA_OUTPUTSIZE", "30")
            .parse()
            .context("TWELVEDATA_OUTPUTSIZE must be a positive integer")?;

        let timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "10")
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;

        let clock = env_or("CHART_CLOCK", "12h")
            .parse::<ClockStyle>()
            .map_err(anyhow::Error::msg)?;

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(raw) => csv_list(&raw),
            Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        let dashboard_symbols = match std::env::var("DASHBOARD_SYMBOLS") {
            Ok(raw) => Selection::from_csv(&raw, Default::default()).symbols,
            Err(_) => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };

        let config = Self {
            port,
            twelvedata: TwelveDataSettings {
                api_key,
                base_url: env_or("TWELVEDATA_BASE_URL", "https://api.twelvedata.com"),
                outputsize,
                exchange: env_or("TWELVEDATA_EXCHANGE", "NYSE"),
                country: env_or("TWELVEDATA_COUNTRY", "US"),
                request_timeout: Duration::from_secs(timeout_secs),
            },
            cors_origins,
            dashboard_symbols,
            clock,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.twelvedata.api_key.trim().is_empty() {
            bail!("TWELVEDATA_API_KEY is empty");
        }
        url::Url::parse(&self.twelvedata.base_url)
            .with_context(|| format!("Invalid TWELVEDATA_BASE_URL: {}", self.twelvedata.base_url))?;
        if self.twelvedata.outputsize == 0 || self.twelvedata.outputsize > 5000 {
            bail!("TWELVEDATA_OUTPUTSIZE must be between 1 and 5000");
        }
        if self.twelvedata.request_timeout.is_zero() {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        for origin in &self.cors_origins {
            origin
                .parse::<http::HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))?;
        }
        Ok(())
    }
}
