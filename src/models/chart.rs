use serde::{Deserialize, Serialize};

/// One line on the chart. `None` marks a gap and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub values: Vec<Option<f64>>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartModel {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartModel {
    /// Every dataset has exactly one value per label.
    pub fn is_aligned(&self) -> bool {
        self.datasets
            .iter()
            .all(|d| d.values.len() == self.labels.len())
    }
}

/// What the rendering surface currently shows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartState {
    #[default]
    Idle,
    Fetching,
    NoSelection,
    Ready { chart: ChartModel },
    Failed { error: String },
}
