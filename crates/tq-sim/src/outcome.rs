//! `SimOutcome` — what a finished run reports.

use tq_core::{QueryId, SimTime};
use tq_fleet::QueryState;

/// Round half to even at `digits` decimals.
pub fn round_to(x: f64, digits: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let scale = 10f64.powi(digits);
    (x * scale).round_ties_even() / scale
}

/// Final counters of one query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryReport {
    pub query:     QueryId,
    pub column:    usize,
    pub threshold: u32,
    /// Unmet positives, clamped at zero.
    pub remaining: u32,
    pub contacted: u32,
    pub received:  u32,
    pub positive:  u32,
    pub negative:  u32,
    /// Milliseconds from the starting time, `INFINITY` if unresolved.
    pub resolution_ms: f64,
    pub estimate:  Option<f64>,
}

impl QueryReport {
    pub fn new(query: QueryId, state: &QueryState, start: SimTime) -> Self {
        let resolution_ms = match state.resolution {
            Some(t) if t.is_finite() => round_to(t.millis_since(start), 2),
            _ => f64::INFINITY,
        };
        Self {
            query,
            column:    state.spec.column,
            threshold: state.spec.threshold,
            remaining: state.remaining_clamped(),
            contacted: state.contacted,
            received:  state.received,
            positive:  state.positive,
            negative:  state.negative,
            resolution_ms,
            estimate:  state.estimate.map(|e| round_to(e, 5)),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution_ms.is_finite()
    }
}

/// Results of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOutcome {
    /// Name of the policy that produced the run.
    pub policy: &'static str,

    /// Per-query resolution time in ms after the start, 2 decimals,
    /// `INFINITY` when unresolved.
    pub resolution_ms: Vec<f64>,

    /// Work summed over the fleet, ms, 2 decimals.
    pub total_work_ms: f64,

    /// Per-query positive-rate estimates, 5 decimals.
    pub estimates: Vec<Option<f64>>,

    /// Per-vehicle work, ms, 2 decimals.
    pub vehicle_work_ms: Vec<f64>,

    pub reports: Vec<QueryReport>,

    /// Events dispatched by the loop.
    pub events_processed: u64,

    /// Time of the last dispatched event.
    pub end_time: SimTime,
}

impl SimOutcome {
    /// Largest resolution time; `INFINITY` if any query is unresolved.
    pub fn max_resolution_ms(&self) -> f64 {
        self.resolution_ms.iter().copied().fold(0.0, f64::max)
    }

    pub fn all_resolved(&self) -> bool {
        self.reports.iter().all(QueryReport::is_resolved)
    }
}
