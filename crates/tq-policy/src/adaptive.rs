//! Batch-size math shared by the balanced and fair policies.
//!
//! With `p = max(positive / received, 1 / (received + 1))` and
//! `futures = queried - received`, the number of new contacts is
//!
//! ```text
//! r = ceil(alpha * round(remaining - futures * p) / p)
//! ```
//!
//! capped at the pool size.  `round` ties to even.

use crate::error::{PolicyError, PolicyResult};

/// Tunables of the adaptive policies.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveParams {
    /// Safety margin applied to the estimated number of contacts needed.
    pub alpha: f64,
    /// Fraction of contacts that must have come back before a new batch.
    pub beta:  f64,
}

impl AdaptiveParams {
    pub const DEFAULT_ALPHA: f64 = 1.25;
    pub const DEFAULT_BETA: f64 = 0.7;

    /// Values below 1 for `alpha` are accepted (parameter sweeps use them);
    /// `alpha` must be finite and positive, `beta` in `[0, 1]`.
    pub fn new(alpha: f64, beta: f64) -> PolicyResult<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(PolicyError::Config(format!("alpha must be > 0, got {alpha}")));
        }
        if !(0.0..=1.0).contains(&beta) {
            return Err(PolicyError::Config(format!("beta must be in [0, 1], got {beta}")));
        }
        Ok(Self { alpha, beta })
    }
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self { alpha: Self::DEFAULT_ALPHA, beta: Self::DEFAULT_BETA }
    }
}

/// Per-query counters the adaptive policies keep.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AdaptiveStats {
    /// Contacts issued.
    pub queried:  u32,
    /// Contacts considered settled (answered or timed out).
    pub received: u32,
    /// Positive answers, late ones included.
    pub positive: u32,
}

impl AdaptiveStats {
    /// Contacts issued but not yet settled.
    pub fn futures(&self) -> f64 {
        self.queried as f64 - self.received as f64
    }

    /// Settled fraction of issued contacts.  An idle query counts as fully
    /// settled.
    pub fn response_ratio(&self) -> f64 {
        if self.queried == 0 {
            1.0
        } else {
            self.received as f64 / self.queried as f64
        }
    }

    /// Observed positive rate, floored at `1 / (received + 1)`.
    pub fn positive_rate_floor(&self) -> f64 {
        let observed = if self.received == 0 {
            0.0
        } else {
            self.positive as f64 / self.received as f64
        };
        observed.max(1.0 / (self.received as f64 + 1.0))
    }

    /// Enough contacts came back to size a new batch.
    pub fn is_ready(&self, beta: f64) -> bool {
        self.response_ratio() >= beta
    }
}

/// Number of new contacts to issue for a query with `remaining` unmet
/// positives, given its stats and `pool_len` candidates.
pub fn batch_size(params: &AdaptiveParams, stats: &AdaptiveStats, remaining: i64, pool_len: usize) -> usize {
    let p = stats.positive_rate_floor();
    let unmet = (remaining as f64 - stats.futures() * p).round_ties_even();
    let r = (params.alpha * unmet / p).ceil();
    if r <= 0.0 {
        return 0;
    }
    (r as usize).min(pool_len)
}
