//! The query model: static `QuerySpec` and per-run `QueryState` counters.

use tq_core::SimTime;

/// A threshold question: "do at least `threshold` vehicles satisfy the
/// condition of dataset column `column`?"
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySpec {
    /// Column of the time-cost and answer matrices this query reads.
    pub column: usize,

    /// Positive answers required to resolve the query.
    pub threshold: u32,

    /// Payload transfer time added to the outbound latency, in ms.
    pub payload_ms: f64,
}

impl QuerySpec {
    pub fn new(column: usize, threshold: u32, payload_ms: f64) -> Self {
        Self { column, threshold, payload_ms }
    }
}

/// Running counters of one query during a run.
#[derive(Clone, Debug)]
pub struct QueryState {
    pub spec: QuerySpec,

    /// Threshold minus positives received so far.  Goes negative when
    /// positives keep arriving after resolution; clamp before reporting.
    pub remaining: i64,

    /// Contacts issued (including undeliverable ones).
    pub contacted: u32,

    /// Answers received, late or on time.
    pub received: u32,

    pub positive: u32,

    pub negative: u32,

    /// Set once, when `remaining` first reaches zero; `INFINITY` after
    /// finalization if it never did.
    pub resolution: Option<SimTime>,

    /// Estimated positive-answer rate.
    pub estimate: Option<f64>,
}

impl QueryState {
    pub fn new(spec: QuerySpec) -> Self {
        Self {
            remaining:  spec.threshold as i64,
            spec,
            contacted:  0,
            received:   0,
            positive:   0,
            negative:   0,
            resolution: None,
            estimate:   None,
        }
    }

    /// Record one answer arriving at `time`.  Returns `true` if this answer
    /// resolved the query.
    pub fn record_answer(&mut self, positive: bool, time: SimTime) -> bool {
        self.received += 1;
        if !positive {
            self.negative += 1;
            return false;
        }
        self.positive += 1;
        self.remaining -= 1;
        if self.remaining == 0 && self.resolution.is_none() {
            self.resolution = Some(time);
            let n = self.spec.threshold as f64;
            self.estimate = Some(n / (n + self.negative as f64));
            return true;
        }
        false
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some_and(SimTime::is_finite)
    }

    /// `remaining` clamped at zero, for reporting.
    #[inline]
    pub fn remaining_clamped(&self) -> u32 {
        self.remaining.max(0) as u32
    }

    /// Mark an unresolved query as never resolving and compute a
    /// best-effort estimate.  Idempotent.
    pub fn finalize(&mut self) {
        if self.remaining <= 0 {
            return;
        }
        self.resolution = Some(SimTime::INFINITY);
        let seen = self.positive + self.negative;
        if seen > 0 {
            self.estimate = Some(self.positive as f64 / seen as f64);
        }
    }
}
