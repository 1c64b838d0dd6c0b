//! Drives `Idle → Fetching → Ready | Failed` for the displayed chart.
//!
//! Each refresh takes a new generation number. A result is only applied while
//! its generation is still the latest, so a slow superseded fetch can never
//! overwrite a newer selection (last request wins).

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::external::series_provider::SeriesProvider;
use crate::models::{ChartState, Selection};
use crate::services::chart_assembler::{assemble, AssemblyOptions, ChartError};
use crate::services::series_fetcher::{fetch_all, FetchCycle};

/// Runs one complete fetch cycle without touching shared state.
pub async fn load_chart(
    provider: &dyn SeriesProvider,
    selection: &Selection,
    options: AssemblyOptions,
) -> Result<ChartState, ChartError> {
    match fetch_all(provider, &selection.symbols, selection.interval).await {
        FetchCycle::NoSelection => Ok(ChartState::NoSelection),
        FetchCycle::Completed(outcomes) => {
            let chart = assemble(&outcomes, selection.interval, options)?;
            Ok(ChartState::Ready { chart })
        }
    }
}

/// Converts a cycle result into what the rendering surface shows.
pub fn settle(result: Result<ChartState, ChartError>) -> ChartState {
    match result {
        Ok(state) => state,
        Err(ChartError::NoSelection) => ChartState::NoSelection,
        Err(e) => ChartState::Failed {
            error: e.to_string(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    state: ChartState,
}

pub struct ChartCycle {
    provider: Arc<dyn SeriesProvider>,
    options: AssemblyOptions,
    slot: Mutex<Slot>,
}

impl ChartCycle {
    pub fn new(provider: Arc<dyn SeriesProvider>, options: AssemblyOptions) -> Self {
        Self {
            provider,
            options,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn current(&self) -> ChartState {
        self.slot.lock().state.clone()
    }

    /// Starts a new cycle, superseding whatever is in flight.
    pub fn begin(&self, selection: &Selection) -> CycleTicket {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.state = if selection.is_empty() {
            ChartState::NoSelection
        } else {
            ChartState::Fetching
        };
        CycleTicket {
            generation: slot.generation,
        }
    }

    /// Applies `state` if `ticket` still belongs to the latest cycle.
    pub fn complete(&self, ticket: CycleTicket, state: ChartState) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != ticket.generation {
            debug!(
                "Discarding result of cycle {} (latest is {})",
                ticket.generation, slot.generation
            );
            return false;
        }
        slot.state = state;
        true
    }

    /// Runs a full cycle for `selection`. Returns whether its result was applied.
    pub async fn refresh(&self, selection: Selection) -> bool {
        let ticket = self.begin(&selection);
        self.run(ticket, &selection).await
    }

    /// Fetches and assembles for a cycle already opened with [`ChartCycle::begin`].
    pub async fn run(&self, ticket: CycleTicket, selection: &Selection) -> bool {
        if selection.is_empty() {
            info!("Cycle {}: no symbols selected", ticket.generation);
            return self.complete(ticket, ChartState::NoSelection);
        }

        info!(
            "Cycle {}: loading {:?} at {}",
            ticket.generation, selection.symbols, selection.interval
        );
        let state = settle(load_chart(self.provider.as_ref(), selection, self.options).await);
        if let ChartState::Failed { error } = &state {
            warn!("Cycle {} failed: {}", ticket.generation, error);
        }

        self.complete(ticket, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::series_provider::FetchError;
    use crate::models::Interval;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Holds back `PFE` until released; every other symbol answers at once.
    struct GatedProvider {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SeriesProvider for GatedProvider {
        async fn time_series_raw(&self, symbol: &str, _interval: Interval) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "PFE" {
                self.gate.notified().await;
            }
            if symbol == "LLY" {
                return Err(FetchError::Network("connection refused".into()));
            }
            Ok(json!({
                "meta": { "symbol": symbol },
                "values": [
                    { "datetime": "2025-02-11", "close": "2.0" },
                    { "datetime": "2025-02-10", "close": "1.0" }
                ]
            }))
        }
    }

    fn cycle() -> (Arc<GatedProvider>, Arc<ChartCycle>) {
        let provider = Arc::new(GatedProvider {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let cycle = Arc::new(ChartCycle::new(provider.clone(), AssemblyOptions::default()));
        (provider, cycle)
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let (_, cycle) = cycle();
        assert_eq!(cycle.current(), ChartState::Idle);
    }

    #[tokio::test]
    async fn test_empty_selection_goes_to_no_selection_without_fetching() {
        let (provider, cycle) = cycle();

        let applied = cycle.refresh(Selection::new(Vec::<String>::new(), Interval::Daily)).await;

        assert!(applied);
        assert_eq!(cycle.current(), ChartState::NoSelection);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_cycle_is_ready() {
        let (_, cycle) = cycle();

        cycle.refresh(Selection::from_csv("UNH,JNJ", Interval::Daily)).await;

        let ChartState::Ready { chart } = cycle.current() else {
            panic!("expected ready state, got {:?}", cycle.current());
        };
        assert_eq!(chart.labels, vec!["Feb 10", "Feb 11"]);
        assert_eq!(chart.datasets.len(), 2);
    }

    #[tokio::test]
    async fn test_single_failure_fails_cycle() {
        let (_, cycle) = cycle();

        cycle.refresh(Selection::from_csv("UNH,LLY", Interval::Daily)).await;

        match cycle.current() {
            ChartState::Failed { error } => assert!(error.contains("LLY")),
            other => panic!("expected failed state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_newer_selection_wins_over_in_flight_cycle() {
        let (provider, cycle) = cycle();

        let slow = {
            let cycle = cycle.clone();
            tokio::spawn(async move { cycle.refresh(Selection::from_csv("PFE", Interval::Daily)).await })
        };

        // Let the slow cycle reach the gate.
        while provider.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(cycle.current(), ChartState::Fetching);

        let applied = cycle.refresh(Selection::from_csv("JNJ", Interval::Weekly)).await;
        assert!(applied);

        provider.gate.notify_one();
        let slow_applied = slow.await.unwrap();
        assert!(!slow_applied);

        let ChartState::Ready { chart } = cycle.current() else {
            panic!("expected ready state");
        };
        assert_eq!(chart.datasets[0].label, "JNJ");
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let provider = Arc::new(GatedProvider {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let cycle = ChartCycle::new(provider, AssemblyOptions::default());

        let first = cycle.begin(&Selection::from_csv("PFE", Interval::Daily));
        let second = cycle.begin(&Selection::from_csv("LLY", Interval::Daily));

        assert!(!cycle.complete(first, ChartState::Failed { error: "old".into() }));
        assert_eq!(cycle.current(), ChartState::Fetching);
        assert!(cycle.complete(second, ChartState::NoSelection));
        assert_eq!(cycle.current(), ChartState::NoSelection);
    }

    #[test]
    fn test_settle_maps_errors() {
        assert_eq!(settle(Err(ChartError::NoSelection)), ChartState::NoSelection);
        let state = settle(Err(ChartError::Aggregate { failures: vec![] }));
        assert!(matches!(state, ChartState::Failed { .. }));
    }
}
