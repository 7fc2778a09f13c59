//! Connectivity windows: `ActivePeriod` and `Connectivity`.
//!
//! # Window model
//!
//! Each vehicle carries a `Connectivity` consisting of an ordered list of
//! disjoint active periods, in seconds:
//!
//! ```text
//! [(s0, e0), (s1, e1), …]     s0 < e0 ≤ s1 < e1 ≤ …
//! ```
//!
//! Gaps between periods are disconnection.  A vehicle is reachable at `t`
//! iff some period satisfies `start ≤ t ≤ end`.  Periods may touch
//! (`e_i == s_{i+1}`); a lookup at the shared instant resolves to the
//! earlier period.

use tq_core::{SECS_PER_DAY, SimTime};

use crate::{FleetError, FleetResult};

// ── ActivePeriod ──────────────────────────────────────────────────────────────

/// One contiguous interval during which a vehicle can receive and answer
/// queries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActivePeriod {
    pub start: SimTime,
    pub end:   SimTime,
}

impl ActivePeriod {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self { start: SimTime(start_secs), end: SimTime(end_secs) }
    }

    /// `true` if `t` lies within `[start, end]`.
    #[inline]
    pub fn contains(&self, t: SimTime) -> bool {
        self.start <= t && t <= self.end
    }

    /// Length of the period in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.end.0 - self.start.0
    }
}

// ── Connectivity ──────────────────────────────────────────────────────────────

/// A vehicle's ordered, non-overlapping active periods.
///
/// Periods are stored sorted by start so that lookups are O(log n) binary
/// searches.
#[derive(Clone, Debug, PartialEq)]
pub struct Connectivity {
    /// Active periods, sorted ascending, pairwise disjoint.
    periods: Vec<ActivePeriod>,
}

impl Connectivity {
    /// Validate and wrap `periods`.
    ///
    /// `vehicle` is only used for error reporting.  Fails if any period has
    /// `start >= end`, a non-finite bound, or if periods are unsorted or
    /// overlap.
    pub fn new(periods: Vec<ActivePeriod>, vehicle: usize) -> FleetResult<Self> {
        for (i, p) in periods.iter().enumerate() {
            if !p.start.is_finite() || !p.end.is_finite() {
                return Err(FleetError::InvalidPeriods {
                    vehicle,
                    reason: format!("period {i} has a non-finite bound"),
                });
            }
            if p.start >= p.end {
                return Err(FleetError::InvalidPeriods {
                    vehicle,
                    reason: format!("period {i} starts at {} but ends at {}", p.start, p.end),
                });
            }
        }
        if let Some(i) = periods.windows(2).position(|w| w[1].start < w[0].end) {
            return Err(FleetError::InvalidPeriods {
                vehicle,
                reason: format!("period {} overlaps or precedes period {i}", i + 1),
            });
        }
        Ok(Self { periods })
    }

    /// Static model: one window spanning the whole simulated day.
    pub fn all_day() -> Self {
        Self { periods: vec![ActivePeriod::new(0.0, SECS_PER_DAY)] }
    }

    /// A vehicle that is never connected.
    pub fn never() -> Self {
        Self { periods: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Read-only slice of all periods (sorted by start).
    pub fn periods(&self) -> &[ActivePeriod] {
        &self.periods
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// The earliest period containing `t`, or `None` if the vehicle is
    /// disconnected at `t`.
    pub fn period_at(&self, t: SimTime) -> Option<&ActivePeriod> {
        // Ends are ascending too, so this is the first period not wholly
        // before `t`.
        let idx = self.periods.partition_point(|p| p.end < t);
        self.periods.get(idx).filter(|p| p.start <= t)
    }

    #[inline]
    pub fn is_active(&self, t: SimTime) -> bool {
        self.period_at(t).is_some()
    }

    /// Start instants strictly after `after` and, when a horizon is given,
    /// no later than it.  These become `VehicleJoining` events.
    pub fn joins_after(
        &self,
        after:   SimTime,
        horizon: Option<SimTime>,
    ) -> impl Iterator<Item = SimTime> + '_ {
        self.periods
            .iter()
            .map(|p| p.start)
            .filter(move |&s| s > after && horizon.is_none_or(|h| s <= h))
    }

    /// Total connected seconds.
    pub fn active_secs(&self) -> f64 {
        self.periods.iter().map(ActivePeriod::duration_secs).sum()
    }
}
