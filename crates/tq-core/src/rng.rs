//! Deterministic simulation RNG wrapper.
//!
//! # Determinism strategy
//!
//! Every source of randomness in a run (initial query order, pool
//! shuffling, latency sampling, fairness tie-breaks) draws from a `SimRng`
//! that is derived from the run's master seed.  Nothing touches a
//! thread-local or process-wide generator.
//!
//! Independent trials of the same scenario are seeded by:
//!
//!   seed = master_seed XOR (trial * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive trial numbers uniformly across the seed space,
//! so a trial's results do not depend on which worker thread ran it.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed of trial `trial` in a batch run from `master_seed`.
#[inline]
pub fn trial_seed(master_seed: u64, trial: u64) -> u64 {
    master_seed ^ trial.wrapping_mul(MIXING_CONSTANT)
}

/// Simulation-level seedable RNG.
///
/// Used only in single-threaded contexts.  If you need parallel
/// randomness, give each worker its own `SimRng` via [`SimRng::for_trial`]
/// or [`SimRng::child`].
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed deterministically from a master seed and a trial number.
    pub fn for_trial(master_seed: u64, trial: u64) -> Self {
        SimRng::new(trial_seed(master_seed, trial))
    }

    /// Derive a child `SimRng` with a different seed offset.  The engine and
    /// the policy each get their own stream from one root seed.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types
    /// (`rng.inner().sample(...)`, etc.)
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
