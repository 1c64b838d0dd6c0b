use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use stocks_dashboard::app;
use stocks_dashboard::config::AppConfig;
use stocks_dashboard::external::series_provider::SeriesProvider;
use stocks_dashboard::external::twelvedata::TwelveDataProvider;
use stocks_dashboard::logging::{init_logging, LoggingConfig};
use stocks_dashboard::services::chart_assembler::AssemblyOptions;
use stocks_dashboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env()?;

    let provider: Arc<dyn SeriesProvider> = Arc::new(
        TwelveDataProvider::new(config.twelvedata.clone())
            .context("Failed to create TwelveDataProvider")?,
    );
    tracing::info!(
        "📊 Using Twelve Data ({} {}, outputsize {}, timeout {:?})",
        config.twelvedata.exchange,
        config.twelvedata.country,
        config.twelvedata.outputsize,
        config.twelvedata.request_timeout
    );

    let state = AppState::new(
        provider,
        config.dashboard_symbols.clone(),
        AssemblyOptions { clock: config.clock },
    );
    let app = app::create_app(state, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Server is running on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
