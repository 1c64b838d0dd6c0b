use std::sync::Arc;

use crate::external::series_provider::SeriesProvider;
use crate::services::chart_assembler::AssemblyOptions;
use crate::services::chart_cycle::ChartCycle;

#[derive(Clone)]
pub struct AppState {
    pub series_provider: Arc<dyn SeriesProvider>,
    pub dashboard: Arc<ChartCycle>,
    pub dashboard_symbols: Arc<Vec<String>>,
    pub assembly: AssemblyOptions,
}

impl AppState {
    pub fn new(
        series_provider: Arc<dyn SeriesProvider>,
        dashboard_symbols: Vec<String>,
        assembly: AssemblyOptions,
    ) -> Self {
        let dashboard = Arc::new(ChartCycle::new(series_provider.clone(), assembly));
        Self {
            series_provider,
            dashboard,
            dashboard_symbols: Arc::new(dashboard_symbols),
            assembly,
        }
    }
}
