//! Multi-run experiments built on [`run_trials`].

use std::path::Path;

use log::info;
use tq_core::trial_seed;
use tq_output::{CsvWriter, EstimateErrorRow, FairnessRow, OutputWriter, VehicleWorkRow};
use tq_policy::{AdaptiveParams, PolicyKind};
use tq_sim::round_to;

use crate::{DriverError, DriverResult, ExperimentConfig, Scenario, ScenarioFile, TrialSet, run_trials, stats};

/// File-name label of a policy.  Adaptive policies with non-default
/// tunables carry them in the label.
pub fn policy_label(kind: &PolicyKind) -> String {
    match *kind {
        PolicyKind::Balanced { alpha, beta } | PolicyKind::Fair { alpha, beta }
            if alpha != AdaptiveParams::DEFAULT_ALPHA || beta != AdaptiveParams::DEFAULT_BETA =>
        {
            format!("{}_a{alpha}_b{beta}", kind.name())
        }
        _ => kind.name().to_owned(),
    }
}

// ── Alpha/beta sweep ──────────────────────────────────────────────────────────

/// Averages of one `(alpha, beta)` grid point.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepPoint {
    pub alpha: f64,
    pub beta:  f64,
    pub mean_max_resolution_ms: f64,
    pub mean_total_work_ms:     f64,
}

/// Balanced policy over the full `alphas x betas` grid, alpha-major.
pub fn alpha_beta_sweep(
    scenario: &Scenario,
    alphas:   &[f64],
    betas:    &[f64],
    trials:   u32,
) -> DriverResult<Vec<(SweepPoint, TrialSet)>> {
    let mut out = Vec::with_capacity(alphas.len() * betas.len());
    for &alpha in alphas {
        for &beta in betas {
            let set = run_trials(scenario, &PolicyKind::Balanced { alpha, beta }, trials)?;
            let work: Vec<f64> = set.rows.iter().map(|r| r.total_work_ms).collect();
            let point = SweepPoint {
                alpha,
                beta,
                mean_max_resolution_ms: set.mean_max_resolution_ms(),
                mean_total_work_ms: stats::mean(&work),
            };
            out.push((point, set));
        }
    }
    Ok(out)
}

// ── Estimation error ──────────────────────────────────────────────────────────

/// For every policy and threshold `n`, run the first `ground_truth.len()`
/// scenario queries with threshold `n` and report
/// `|truth - estimate|` per query (4 decimals).  A query without an
/// estimate counts as estimating 0.  With `repetitions > 1` the errors are
/// averaged.
pub fn estimation_errors(
    scenario:     &Scenario,
    policies:     &[PolicyKind],
    thresholds:   &[u32],
    ground_truth: &[f64],
    repetitions:  u32,
) -> DriverResult<Vec<EstimateErrorRow>> {
    if scenario.queries.len() < ground_truth.len() {
        return Err(DriverError::Config(format!(
            "{} ground-truth rates but only {} queries",
            ground_truth.len(),
            scenario.queries.len()
        )));
    }
    let repetitions = repetitions.max(1);
    let mut rows = Vec::with_capacity(policies.len() * thresholds.len());

    for kind in policies {
        for &n in thresholds {
            let queries: Vec<_> = scenario.queries[..ground_truth.len()]
                .iter()
                .map(|q| tq_fleet::QuerySpec { threshold: n, ..q.clone() })
                .collect();
            let mut sums = vec![0.0; ground_truth.len()];
            for rep in 0..repetitions {
                let seed = trial_seed(scenario.sim.seed, u64::from(rep));
                let outcome = scenario.simulate_queries(kind, seed, &queries)?;
                for (acc, (truth, est)) in sums.iter_mut().zip(ground_truth.iter().zip(&outcome.estimates)) {
                    *acc += (truth - est.unwrap_or(0.0)).abs();
                }
            }
            let errors: Vec<f64> = sums.into_iter().map(|s| round_to(s / f64::from(repetitions), 4)).collect();
            info!("{} n={n}: errors {:?}", kind.name(), errors);
            rows.push(EstimateErrorRow { policy: policy_label(kind), n, errors });
        }
    }
    Ok(rows)
}

// ── Fairness ──────────────────────────────────────────────────────────────────

/// Spread of per-vehicle work, one column per policy.
#[derive(Clone, Debug)]
pub struct FairnessReport {
    pub policies: Vec<String>,
    /// Sample standard deviation of per-vehicle work, per trial.
    pub rows:     Vec<FairnessRow>,
    /// Per-vehicle work averaged over trials.
    pub works:    Vec<VehicleWorkRow>,
}

impl FairnessReport {
    pub fn write<W: OutputWriter>(&self, writer: &mut W) -> DriverResult<()> {
        let names: Vec<&str> = self.policies.iter().map(String::as_str).collect();
        for row in &self.rows {
            writer.write_fairness(&names, row)?;
        }
        writer.write_vehicle_work(&names, &self.works)?;
        Ok(())
    }
}

pub fn fairness(scenario: &Scenario, policies: &[PolicyKind], trials: u32) -> DriverResult<FairnessReport> {
    let vehicles = scenario.vehicle_count();
    let mut rows: Vec<FairnessRow> = (0..trials)
        .map(|trial| FairnessRow { trial, stdev: Vec::with_capacity(policies.len()) })
        .collect();
    let mut works: Vec<VehicleWorkRow> = (0..vehicles)
        .map(|v| VehicleWorkRow { vehicle: v as u32, work_ms: Vec::with_capacity(policies.len()) })
        .collect();

    for kind in policies {
        let set = run_trials(scenario, kind, trials)?;
        let mut sums = vec![0.0; vehicles];
        for (row, outcome) in rows.iter_mut().zip(&set.outcomes) {
            row.stdev.push(round_to(stats::sample_stdev(&outcome.vehicle_work_ms), 2));
            for (acc, w) in sums.iter_mut().zip(&outcome.vehicle_work_ms) {
                *acc += w;
            }
        }
        for (row, sum) in works.iter_mut().zip(sums) {
            row.work_ms.push(round_to(sum / f64::from(trials.max(1)), 2));
        }
    }

    Ok(FairnessReport { policies: policies.iter().map(policy_label).collect(), rows, works })
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

/// Run the experiment selected by `file` and write its CSV files into
/// `file.output_dir`.
pub fn execute(file: &ScenarioFile, scenario: &Scenario) -> DriverResult<()> {
    let out = file.output_dir.as_path();
    match &file.experiment {
        ExperimentConfig::Trials => {
            for kind in &file.policies {
                let set = run_trials(scenario, kind, file.trials)?;
                write_set(out, &policy_label(kind), &set)?;
            }
        }
        ExperimentConfig::Sweep { alphas, betas } => {
            for (point, set) in alpha_beta_sweep(scenario, alphas, betas, file.trials)? {
                info!(
                    "alpha={} beta={}: resolution {:.2} ms, work {:.2} ms",
                    point.alpha, point.beta, point.mean_max_resolution_ms, point.mean_total_work_ms
                );
                write_set(out, &policy_label(&set.policy), &set)?;
            }
        }
        ExperimentConfig::Estimation { thresholds, ground_truth } => {
            let rows = estimation_errors(scenario, &file.policies, thresholds, ground_truth, file.trials)?;
            let mut writer = CsvWriter::new(out)?;
            for row in &rows {
                writer.write_estimate_error(row)?;
            }
            writer.finish()?;
        }
        ExperimentConfig::Fairness => {
            let report = fairness(scenario, &file.policies, file.trials)?;
            let mut writer = CsvWriter::new(out)?;
            report.write(&mut writer)?;
            writer.finish()?;
        }
    }
    Ok(())
}

fn write_set(dir: &Path, label: &str, set: &TrialSet) -> DriverResult<()> {
    let mut writer = CsvWriter::with_prefix(dir, &format!("{label}_"))?;
    set.write(&mut writer)?;
    writer.finish()?;
    Ok(())
}
