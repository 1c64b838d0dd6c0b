mod chart;
mod interval;
mod selection;
mod series;

pub use chart::{ChartDataset, ChartModel, ChartState};
pub use interval::Interval;
pub use selection::Selection;
pub use series::{RawBar, SeriesResponse};
