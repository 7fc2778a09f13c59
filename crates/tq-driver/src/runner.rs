//! Repeated trials of one policy on one scenario.

use log::{debug, info};
use tq_core::trial_seed;
use tq_output::{OutputWriter, TrialRow};
use tq_policy::PolicyKind;
use tq_sim::SimOutcome;

use crate::{DriverResult, Scenario, stats};

/// Results of `m` trials of one policy, in trial order.
#[derive(Clone, Debug)]
pub struct TrialSet {
    pub policy:   PolicyKind,
    pub rows:     Vec<TrialRow>,
    pub outcomes: Vec<SimOutcome>,
}

impl TrialSet {
    /// Column-wise mean over all trials.
    pub fn mean(&self) -> Option<TrialRow> {
        TrialRow::mean(&self.rows)
    }

    /// Mean over trials of the slowest query's resolution time.
    pub fn mean_max_resolution_ms(&self) -> f64 {
        let maxima: Vec<f64> = self.rows.iter().map(TrialRow::max_resolution_ms).collect();
        stats::mean(&maxima)
    }

    /// Every trial line followed by the summary line.
    pub fn write<W: OutputWriter>(&self, writer: &mut W) -> DriverResult<()> {
        for row in &self.rows {
            writer.write_trial(row)?;
        }
        if let Some(mean) = self.mean() {
            writer.write_summary(&mean)?;
        }
        Ok(())
    }
}

/// Run `kind` `trials` times.  Trial `i` is seeded with
/// `trial_seed(scenario.sim.seed, i)`, so the result does not depend on
/// execution order.
pub fn run_trials(scenario: &Scenario, kind: &PolicyKind, trials: u32) -> DriverResult<TrialSet> {
    info!("{}: {} x {} on {} vehicles", scenario.name, kind.name(), trials, scenario.vehicle_count());

    let outcomes = simulate_all(scenario, kind, trials)?;
    let rows: Vec<TrialRow> = outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| TrialRow::from_outcome(i as u32, o))
        .collect();

    let set = TrialSet { policy: *kind, rows, outcomes };
    info!(
        "{}: {} mean max resolution {:.2} ms",
        scenario.name,
        kind.name(),
        set.mean_max_resolution_ms()
    );
    Ok(set)
}

fn run_one(scenario: &Scenario, kind: &PolicyKind, trial: u32) -> DriverResult<SimOutcome> {
    let outcome = scenario.simulate(kind, trial_seed(scenario.sim.seed, u64::from(trial)))?;
    debug!(
        "{} trial {trial}: max resolution {:.2} ms, work {:.2} ms",
        kind.name(),
        outcome.max_resolution_ms(),
        outcome.total_work_ms
    );
    Ok(outcome)
}

#[cfg(not(feature = "parallel"))]
fn simulate_all(scenario: &Scenario, kind: &PolicyKind, trials: u32) -> DriverResult<Vec<SimOutcome>> {
    (0..trials).map(|t| run_one(scenario, kind, t)).collect()
}

#[cfg(feature = "parallel")]
fn simulate_all(scenario: &Scenario, kind: &PolicyKind, trials: u32) -> DriverResult<Vec<SimOutcome>> {
    use rayon::prelude::*;
    (0..trials).into_par_iter().map(|t| run_one(scenario, kind, t)).collect()
}
