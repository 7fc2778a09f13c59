//! Network latency models.
//!
//! The engine draws one value per contact from a [`LatencyModel`] and uses
//! it as the one-way latency (ms) for both directions of that contact:
//! query delivery and answer return.  Models receive the engine's
//! [`SimRng`] so sampled runs stay reproducible.

use rand_distr::{Distribution, Gamma};

use crate::{SimRng, TqError, TqResult};

/// Source of per-contact one-way latencies, in milliseconds.
///
/// The engine treats negative samples as zero and rejects NaN.
pub trait LatencyModel {
    /// Draw the latency for one contact.
    fn sample_ms(&mut self, rng: &mut SimRng) -> f64;
}

impl<L: LatencyModel + ?Sized> LatencyModel for Box<L> {
    fn sample_ms(&mut self, rng: &mut SimRng) -> f64 {
        (**self).sample_ms(rng)
    }
}

// ── FixedLatency ──────────────────────────────────────────────────────────────

/// The same latency for every contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedLatency(pub f64);

impl LatencyModel for FixedLatency {
    #[inline]
    fn sample_ms(&mut self, _rng: &mut SimRng) -> f64 {
        self.0
    }
}

// ── GammaLatency ──────────────────────────────────────────────────────────────

/// Shifted gamma distribution: `location + Gamma(shape, scale)`.
#[derive(Clone, Debug)]
pub struct GammaLatency {
    dist:        Gamma<f64>,
    location_ms: f64,
}

impl GammaLatency {
    /// `location_ms` must be finite and non-negative.
    pub fn new(shape: f64, scale_ms: f64, location_ms: f64) -> TqResult<Self> {
        if !location_ms.is_finite() || location_ms < 0.0 {
            return Err(TqError::Latency(format!("gamma location must be >= 0, got {location_ms} ms")));
        }
        let dist = Gamma::new(shape, scale_ms)
            .map_err(|e| TqError::Latency(format!("gamma({shape}, {scale_ms}): {e}")))?;
        Ok(Self { dist, location_ms })
    }

    /// Measured 4G round-trip profile: shape 8, scale 5 ms, offset 20 ms
    /// (mean ≈ 60 ms, never below 20 ms).
    pub fn mobile_4g() -> TqResult<Self> {
        Self::new(8.0, 5.0, 20.0)
    }
}

impl LatencyModel for GammaLatency {
    fn sample_ms(&mut self, rng: &mut SimRng) -> f64 {
        self.location_ms + self.dist.sample(rng.inner())
    }
}

// ── EmpiricalLatency ──────────────────────────────────────────────────────────

/// Uniform draw from a list of measured latencies.
#[derive(Clone, Debug)]
pub struct EmpiricalLatency {
    samples: Vec<f64>,
}

impl EmpiricalLatency {
    pub fn new(samples: Vec<f64>) -> TqResult<Self> {
        if samples.is_empty() {
            return Err(TqError::Latency("empirical latency needs at least one sample".into()));
        }
        if let Some(bad) = samples.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(TqError::Latency(format!("invalid latency sample {bad}")));
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl LatencyModel for EmpiricalLatency {
    fn sample_ms(&mut self, rng: &mut SimRng) -> f64 {
        self.samples[rng.gen_range(0..self.samples.len())]
    }
}

// ── FnLatency ─────────────────────────────────────────────────────────────────

/// Adapter turning any `FnMut(&mut SimRng) -> f64` into a [`LatencyModel`].
///
/// ```rust,ignore
/// let jitter = FnLatency(|rng: &mut SimRng| 40.0 + rng.gen_range(0.0..20.0));
/// ```
pub struct FnLatency<F>(pub F);

impl<F: FnMut(&mut SimRng) -> f64> LatencyModel for FnLatency<F> {
    #[inline]
    fn sample_ms(&mut self, rng: &mut SimRng) -> f64 {
        (self.0)(rng)
    }
}
