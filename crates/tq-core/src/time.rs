//! Simulated time model.
//!
//! # Design
//!
//! Time is a continuous quantity in this simulator: contacts are separated
//! by millisecond latencies while connectivity windows are expressed in
//! seconds of the day.  `SimTime` therefore wraps an `f64` number of
//! seconds and gives it a *total* order (`f64::total_cmp`) so it can key the
//! event heap and sort deterministically.
//!
//! All user-facing durations (latency, work, payload transfer, timer) are
//! expressed in milliseconds and converted at the edges with
//! [`SimTime::after_millis`] / [`SimTime::millis_since`].

use std::cmp::Ordering;
use std::fmt;

use crate::{TqError, TqResult};

/// Seconds in one simulated day; the span of the static connectivity model.
pub const SECS_PER_DAY: f64 = 86_400.0;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulated instant, in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Resolution time of a query that never resolved.
    pub const INFINITY: SimTime = SimTime(f64::INFINITY);

    #[inline]
    pub fn from_secs(secs: f64) -> SimTime {
        SimTime(secs)
    }

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// The instant `ms` milliseconds after `self`.
    #[inline]
    pub fn after_millis(self, ms: f64) -> SimTime {
        SimTime(self.0 + ms / 1000.0)
    }

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier`
    /// is later).
    #[inline]
    pub fn millis_since(self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0) * 1000.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// The later of two instants.
    #[inline]
    pub fn max(self, other: SimTime) -> SimTime {
        if other > self { other } else { self }
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}s", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Per-run engine configuration.
///
/// Typically embedded in a scenario file by the driver crate and passed to
/// the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Clock time (seconds) at which all queries are issued, e.g. 18:00 =
    /// 64 800.  Vehicles active at this instant form the initial pools.
    pub starting_time_secs: f64,

    /// Optional horizon (seconds).  Vehicles joining later are ignored and
    /// the event loop stops at the first event past it.
    pub ending_time_secs: Option<f64>,

    /// Deadline after which a contact without an answer is signalled to the
    /// policy.  Default: 1000 ms.
    pub timer_duration_ms: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_time_secs: 0.0,
            ending_time_secs:   None,
            timer_duration_ms:  1000.0,
            seed:               0,
        }
    }
}

impl SimConfig {
    #[inline]
    pub fn start(&self) -> SimTime {
        SimTime(self.starting_time_secs)
    }

    #[inline]
    pub fn end(&self) -> Option<SimTime> {
        self.ending_time_secs.map(SimTime)
    }

    /// `true` if `time` lies past the configured horizon.
    #[inline]
    pub fn is_past_horizon(&self, time: SimTime) -> bool {
        self.end().is_some_and(|end| time > end)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> TqResult<()> {
        if !self.starting_time_secs.is_finite() {
            return Err(TqError::Config("starting time must be finite".into()));
        }
        if self.timer_duration_ms.is_nan() || self.timer_duration_ms <= 0.0 {
            return Err(TqError::Config(format!(
                "timer duration must be positive, got {} ms",
                self.timer_duration_ms
            )));
        }
        if let Some(end) = self.ending_time_secs {
            if end < self.starting_time_secs {
                return Err(TqError::Config(format!(
                    "ending time {end} precedes starting time {}",
                    self.starting_time_secs
                )));
            }
        }
        Ok(())
    }
}
