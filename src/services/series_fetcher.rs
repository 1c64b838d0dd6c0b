use futures::future::join_all;
use tracing::{info, warn};

use crate::external::series_provider::{FetchError, SeriesProvider};
use crate::models::{Interval, SeriesResponse};

/// Result of fetching one requested symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub result: Result<SeriesResponse, FetchError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchCycle {
    /// Nothing was selected, so nothing was requested.
    NoSelection,
    /// One outcome per requested symbol, in requested order.
    Completed(Vec<SymbolOutcome>),
}

/// Requests every symbol concurrently and waits for all of them.
pub async fn fetch_all(
    provider: &dyn SeriesProvider,
    symbols: &[String],
    interval: Interval,
) -> FetchCycle {
    if symbols.is_empty() {
        info!("No symbols selected, skipping fetch");
        return FetchCycle::NoSelection;
    }

    let started = std::time::Instant::now();
    let requests = symbols.iter().map(|symbol| async move {
        let result = provider.fetch_series(symbol, interval).await;
        match &result {
            Ok(series) => info!("✓ Fetched {} bars for {} ({})", series.bars.len(), symbol, interval),
            Err(e) => warn!("✗ Failed to fetch {} ({}): {}", symbol, interval, e),
        }
        SymbolOutcome {
            symbol: symbol.clone(),
            result,
        }
    });

    let outcomes = join_all(requests).await;
    info!(
        "📈 Fetched {} symbol(s) at {} in {:?}",
        outcomes.len(),
        interval,
        started.elapsed()
    );

    FetchCycle::Completed(outcomes)
}
