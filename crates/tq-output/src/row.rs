//! Plain data row types written by output backends.

use tq_core::EventKind;
use tq_sim::{Event, SimOutcome, round_to};

/// Resolution times and total work of one trial of one policy.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRow {
    pub trial:         u32,
    /// Per-query resolution time, ms; `INFINITY` when unresolved.
    pub resolution_ms: Vec<f64>,
    pub total_work_ms: f64,
}

impl TrialRow {
    pub fn from_outcome(trial: u32, outcome: &SimOutcome) -> Self {
        Self {
            trial,
            resolution_ms: outcome.resolution_ms.clone(),
            total_work_ms: outcome.total_work_ms,
        }
    }

    /// Column-wise mean of `rows` to 2 decimals, or `None` if `rows` is
    /// empty.  An unresolved query in any trial makes its mean infinite.
    pub fn mean(rows: &[TrialRow]) -> Option<TrialRow> {
        let first = rows.first()?;
        let m = rows.len() as f64;
        let mut res = vec![0.0; first.resolution_ms.len()];
        let mut total = 0.0;
        for row in rows {
            for (acc, r) in res.iter_mut().zip(&row.resolution_ms) {
                *acc += r;
            }
            total += row.total_work_ms;
        }
        Some(TrialRow {
            trial:         rows.len() as u32,
            resolution_ms: res.into_iter().map(|r| round_to(r / m, 2)).collect(),
            total_work_ms: round_to(total / m, 2),
        })
    }

    /// Largest per-query resolution time of the trial.
    pub fn max_resolution_ms(&self) -> f64 {
        self.resolution_ms.iter().copied().fold(0.0, f64::max)
    }
}

/// Work done by one vehicle, one column per policy.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleWorkRow {
    pub vehicle: u32,
    pub work_ms: Vec<f64>,
}

/// Absolute estimation error per query for one policy at threshold `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateErrorRow {
    pub policy: String,
    pub n:      u32,
    pub errors: Vec<f64>,
}

/// Standard deviation of per-vehicle work, one column per policy.
#[derive(Debug, Clone, PartialEq)]
pub struct FairnessRow {
    pub trial:  u32,
    pub stdev:  Vec<f64>,
}

/// One dispatched event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRow {
    pub time_secs: f64,
    pub kind:      EventKind,
    /// `None` for `VehicleJoining`.
    pub query:     Option<u32>,
    pub vehicle:   u32,
}

impl From<&Event> for EventRow {
    fn from(e: &Event) -> Self {
        Self {
            time_secs: e.time.0,
            kind:      e.kind,
            query:     e.query.map(|q| q.0),
            vehicle:   e.vehicle.0,
        }
    }
}
