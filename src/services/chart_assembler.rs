//! Builds a renderable [`ChartModel`] from per-symbol fetch outcomes.
//!
//! Any failed symbol fails the whole chart. Series are not re-aligned to a
//! shared calendar: values are placed by position, oldest first, against the
//! label axis of the first requested symbol.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::external::series_provider::FetchError;
use crate::models::{ChartDataset, ChartModel, Interval, SeriesResponse};
use crate::services::labels::{format_label, ClockStyle};
use crate::services::series_fetcher::SymbolOutcome;

pub const PALETTE: [&str; 6] = [
    "rgb(75, 192, 192)",
    "rgb(255, 99, 132)",
    "rgb(54, 162, 235)",
    "rgb(255, 159, 64)",
    "rgb(153, 102, 255)",
    "rgb(255, 205, 86)",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub clock: ClockStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: FetchError,
}

impl fmt::Display for SymbolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} failure: {})", self.symbol, self.error.kind(), self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("no symbols selected")]
    NoSelection,

    #[error("Failed to fetch stock data for {}", join_failures(.failures))]
    Aggregate { failures: Vec<SymbolFailure> },
}

impl ChartError {
    pub fn failed_symbols(&self) -> Vec<&str> {
        match self {
            ChartError::NoSelection => Vec::new(),
            ChartError::Aggregate { failures } => {
                failures.iter().map(|f| f.symbol.as_str()).collect()
            }
        }
    }
}

fn join_failures(failures: &[SymbolFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn dataset_label(series: &SeriesResponse) -> String {
    match &series.name {
        Some(name) => format!("{} ({})", series.symbol, name),
        None => series.symbol.clone(),
    }
}

fn closing_values(series: &SeriesResponse, axis_len: usize) -> Vec<Option<f64>> {
    let mut values: Vec<Option<f64>> = series
        .chronological()
        .into_iter()
        .map(|bar| {
            let value = bar.close_price();
            if value.is_none() {
                warn!(
                    symbol = %series.symbol,
                    field = "close",
                    datetime = %bar.datetime,
                    raw = ?bar.close,
                    "Unparseable price, leaving a gap"
                );
            }
            value
        })
        .collect();

    if values.len() > axis_len {
        warn!(
            "{} has {} bars but the label axis has {}; dropping {} unlabelled point(s)",
            series.symbol,
            values.len(),
            axis_len,
            values.len() - axis_len
        );
        values.truncate(axis_len);
    } else if values.len() < axis_len {
        debug!(
            "{} has {} bars for {} labels; padding with gaps",
            series.symbol,
            values.len(),
            axis_len
        );
        values.resize(axis_len, None);
    }

    values
}

pub fn assemble(
    outcomes: &[SymbolOutcome],
    interval: Interval,
    options: AssemblyOptions,
) -> Result<ChartModel, ChartError> {
    let mut failures = Vec::new();
    let mut series = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match &outcome.result {
            Ok(s) => series.push(s),
            Err(e) => failures.push(SymbolFailure {
                symbol: outcome.symbol.clone(),
                error: e.clone(),
            }),
        }
    }

    if !failures.is_empty() {
        return Err(ChartError::Aggregate { failures });
    }

    let Some(reference) = series.first() else {
        return Err(ChartError::NoSelection);
    };

    let style = interval.label_style();
    let labels: Vec<String> = reference
        .chronological()
        .into_iter()
        .map(|bar| format_label(&bar.datetime, style, options.clock))
        .collect();

    let datasets = series
        .iter()
        .enumerate()
        .map(|(idx, s)| ChartDataset {
            label: dataset_label(s),
            values: closing_values(s, labels.len()),
            color: color_for(idx).to_string(),
        })
        .collect();

    Ok(ChartModel { labels, datasets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawBar;

    fn bar(datetime: &str, close: &str) -> RawBar {
        RawBar {
            datetime: datetime.to_string(),
            open: None,
            high: None,
            low: None,
            close: Some(close.to_string()),
            volume: None,
        }
    }

    fn ok(symbol: &str, name: Option<&str>, bars: Vec<RawBar>) -> SymbolOutcome {
        SymbolOutcome {
            symbol: symbol.to_string(),
            result: Ok(SeriesResponse {
                symbol: symbol.to_string(),
                name: name.map(str::to_string),
                bars,
            }),
        }
    }

    fn pfe() -> SymbolOutcome {
        ok(
            "PFE",
            None,
            vec![
                bar("2025-02-11", "25.53"),
                bar("2025-02-10", "25.87"),
                bar("2025-02-07", "25.74"),
            ],
        )
    }

    #[test]
    fn test_single_symbol_daily_chart() {
        let model = assemble(&[pfe()], Interval::Daily, AssemblyOptions::default()).unwrap();

        assert_eq!(model.labels, vec!["Feb 7", "Feb 10", "Feb 11"]);
        assert_eq!(model.datasets.len(), 1);
        assert_eq!(model.datasets[0].label, "PFE");
        assert_eq!(
            model.datasets[0].values,
            vec![Some(25.74), Some(25.87), Some(25.53)]
        );
        assert_eq!(model.datasets[0].color, PALETTE[0]);
    }

    #[test]
    fn test_unparseable_close_becomes_gap() {
        let outcome = ok(
            "PFE",
            None,
            vec![
                bar("2025-02-11", "25.53"),
                bar("2025-02-10", "N/A"),
                bar("2025-02-07", "25.74"),
            ],
        );
        let model = assemble(&[outcome], Interval::Daily, AssemblyOptions::default()).unwrap();

        assert_eq!(model.datasets[0].values, vec![Some(25.74), None, Some(25.53)]);
        assert!(model.is_aligned());
    }

    #[test]
    fn test_datasets_follow_requested_order_and_palette() {
        let symbols = ["PFE", "LLY", "UNH", "JNJ", "NVO", "MRK", "ABBV"];
        let outcomes: Vec<_> = symbols
            .iter()
            .map(|s| ok(s, None, vec![bar("2025-02-11", "10")]))
            .collect();

        let model = assemble(&outcomes, Interval::Weekly, AssemblyOptions::default()).unwrap();

        let labels: Vec<_> = model.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, symbols);
        for (idx, dataset) in model.datasets.iter().enumerate() {
            assert_eq!(dataset.color, PALETTE[idx % PALETTE.len()]);
        }
        assert_eq!(model.datasets[6].color, model.datasets[0].color);
    }

    #[test]
    fn test_display_name_annotates_label() {
        let outcome = ok("LLY", Some("Eli Lilly and Company"), vec![bar("2025-02-11", "870.1")]);
        let model = assemble(&[outcome], Interval::Monthly, AssemblyOptions::default()).unwrap();

        assert_eq!(model.datasets[0].label, "LLY (Eli Lilly and Company)");
        assert_eq!(model.labels, vec!["Feb 2025"]);
    }

    #[test]
    fn test_any_failure_fails_the_chart() {
        let outcomes = vec![
            pfe(),
            SymbolOutcome {
                symbol: "LLY".into(),
                result: Err(FetchError::Network("connection refused".into())),
            },
        ];

        let err = assemble(&outcomes, Interval::Daily, AssemblyOptions::default()).unwrap_err();

        assert_eq!(err.failed_symbols(), vec!["LLY"]);
        let message = err.to_string();
        assert!(message.contains("LLY"));
        assert!(message.contains("network failure"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_aggregate_names_every_failed_symbol() {
        let outcomes = vec![
            SymbolOutcome {
                symbol: "UNH".into(),
                result: Err(FetchError::ShapeInvalid("missing 'values' in response".into())),
            },
            SymbolOutcome {
                symbol: "JNJ".into(),
                result: Err(FetchError::Timeout),
            },
        ];

        let err = assemble(&outcomes, Interval::Daily, AssemblyOptions::default()).unwrap_err();
        assert_eq!(err.failed_symbols(), vec!["UNH", "JNJ"]);
        assert!(err.to_string().contains("shape failure"));
    }

    #[test]
    fn test_shorter_and_longer_series_are_aligned_to_reference() {
        let reference = pfe();
        let shorter = ok("LLY", None, vec![bar("2025-02-11", "870.1")]);
        let longer = ok(
            "UNH",
            None,
            vec![
                bar("2025-02-11", "1"),
                bar("2025-02-10", "2"),
                bar("2025-02-07", "3"),
                bar("2025-02-06", "4"),
            ],
        );

        let model = assemble(
            &[reference, shorter, longer],
            Interval::Daily,
            AssemblyOptions::default(),
        )
        .unwrap();

        assert!(model.is_aligned());
        assert_eq!(model.datasets[1].values, vec![Some(870.1), None, None]);
        assert_eq!(model.datasets[2].values, vec![Some(4.0), Some(3.0), Some(2.0)]);
    }

    #[test]
    fn test_intraday_labels_respect_clock_style() {
        let outcome = ok(
            "PFE",
            None,
            vec![bar("2025-02-11 15:30:00", "25.5"), bar("2025-02-11 09:30:00", "25.4")],
        );

        let model = assemble(
            std::slice::from_ref(&outcome),
            Interval::Intraday,
            AssemblyOptions {
                clock: ClockStyle::TwentyFourHour,
            },
        )
        .unwrap();
        assert_eq!(model.labels, vec!["09:30", "15:30"]);

        let model = assemble(&[outcome], Interval::Intraday, AssemblyOptions::default()).unwrap();
        assert_eq!(model.labels, vec!["09:30 AM", "03:30 PM"]);
    }

    #[test]
    fn test_source_series_is_not_reordered() {
        let outcome = pfe();
        assemble(std::slice::from_ref(&outcome), Interval::Daily, AssemblyOptions::default())
            .unwrap();

        let series = outcome.result.as_ref().unwrap();
        assert_eq!(series.bars[0].datetime, "2025-02-11");
    }

    #[test]
    fn test_empty_outcomes_is_no_selection() {
        assert_eq!(
            assemble(&[], Interval::Daily, AssemblyOptions::default()),
            Err(ChartError::NoSelection)
        );
    }
}
