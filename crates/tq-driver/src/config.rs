//! YAML scenario files.
//!
//! ```yaml
//! meta:
//!   name: beijing-evening
//! fleet:
//!   time_matrix: data/times.csv
//!   answer_matrix: data/answers.csv
//!   active_periods: data/periods.csv
//! sim:
//!   starting_time_secs: 64800
//!   timer_duration_ms: 1000
//!   seed: 7
//! latency:
//!   kind: gamma
//! policies:
//!   - kind: lazy
//!   - kind: balanced
//!     alpha: 1.5
//! trials: 100
//! experiment:
//!   kind: fairness
//! ```
//!
//! Every section except `fleet` is optional.  Relative file paths are
//! resolved against the directory containing the scenario file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tq_core::{EmpiricalLatency, FixedLatency, GammaLatency, LatencyModel, SimConfig};
use tq_fleet::{FleetPaths, QuerySpec};
use tq_policy::PolicyKind;
use tq_sim::DEFAULT_LATENCY_MS;

use crate::{DriverError, DriverResult};

/// Transfer cost (ms) of the ten reference queries, by column.
pub const BEIJING_PAYLOAD_MS: [f64; 10] = [0.3, 7.5, 1.3, 0.5, 1.1, 1.6, 1.4, 0.8, 0.7, 3.8];

/// Measured positive rates of the first five reference queries.
pub const BEIJING_POSITIVE_RATE: [f64; 5] = [0.566175, 0.434645, 0.283344, 0.191457, 0.117087];

/// Thresholds swept by the estimation experiment when none are given.
pub const DEFAULT_ESTIMATION_THRESHOLDS: [u32; 8] = [10, 25, 50, 75, 100, 125, 150, 175];

pub const DEFAULT_THRESHOLD: u32 = 50;

// ── File sections ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub name:        Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub time_matrix:   PathBuf,
    pub answer_matrix: PathBuf,
    /// Absent: every vehicle is connected all day.
    #[serde(default)]
    pub active_periods: Option<PathBuf>,
    /// Multiplier on every work sample.
    #[serde(default = "one")]
    pub scale_time: f64,
}

impl FleetConfig {
    pub fn paths(&self) -> FleetPaths {
        FleetPaths {
            time_matrix:    self.time_matrix.clone(),
            answer_matrix:  self.answer_matrix.clone(),
            active_periods: self.active_periods.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Column of the time/answer matrices.
    pub column: usize,
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Defaults to the reference payload of `column`, or 0.
    #[serde(default)]
    pub payload_ms: Option<f64>,
}

impl QueryConfig {
    pub fn spec(&self, scale_query: f64) -> QuerySpec {
        let payload = self
            .payload_ms
            .unwrap_or_else(|| BEIJING_PAYLOAD_MS.get(self.column).copied().unwrap_or(0.0));
        QuerySpec::new(self.column, self.threshold, payload * scale_query)
    }
}

/// Latency model selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LatencyConfig {
    Fixed {
        #[serde(default = "default_latency_ms")]
        ms: f64,
    },
    Gamma {
        #[serde(default = "default_gamma_shape")]
        shape:       f64,
        #[serde(default = "default_gamma_scale")]
        scale_ms:    f64,
        #[serde(default = "default_gamma_location")]
        location_ms: f64,
    },
    Empirical {
        samples_ms: Vec<f64>,
    },
}

impl Default for LatencyConfig {
    fn default() -> Self {
        LatencyConfig::Fixed { ms: DEFAULT_LATENCY_MS }
    }
}

impl LatencyConfig {
    /// A fresh model; called once per simulation.
    pub fn build(&self) -> DriverResult<Box<dyn LatencyModel>> {
        Ok(match self {
            LatencyConfig::Fixed { ms } => {
                if !ms.is_finite() || *ms < 0.0 {
                    return Err(DriverError::Config(format!("fixed latency must be >= 0, got {ms}")));
                }
                Box::new(FixedLatency(*ms))
            }
            LatencyConfig::Gamma { shape, scale_ms, location_ms } => {
                Box::new(GammaLatency::new(*shape, *scale_ms, *location_ms)?)
            }
            LatencyConfig::Empirical { samples_ms } => {
                Box::new(EmpiricalLatency::new(samples_ms.clone())?)
            }
        })
    }
}

/// What `tq-run` does with the scenario.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperimentConfig {
    /// `trials` runs of every policy.
    #[default]
    Trials,
    /// Balanced policy over every `(alpha, beta)` pair.
    Sweep {
        alphas: Vec<f64>,
        betas:  Vec<f64>,
    },
    /// Estimate error against known positive rates, per threshold.
    Estimation {
        #[serde(default = "default_estimation_thresholds")]
        thresholds:   Vec<u32>,
        #[serde(default = "default_ground_truth")]
        ground_truth: Vec<f64>,
    },
    /// Spread of per-vehicle work.
    Fairness,
}

// ── Scenario file ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub meta: ScenarioMeta,
    pub fleet: FleetConfig,
    /// Empty: the ten reference queries at the default threshold.
    #[serde(default)]
    pub queries: Vec<QueryConfig>,
    /// Multiplier on every payload.
    #[serde(default = "one")]
    pub scale_query: f64,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default = "default_policies")]
    pub policies: Vec<PolicyKind>,
    #[serde(default = "default_trials")]
    pub trials: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub experiment: ExperimentConfig,
}

impl ScenarioFile {
    /// Parse without touching the file system; paths stay as written.
    pub fn from_yaml(text: &str) -> DriverResult<Self> {
        let file: ScenarioFile = serde_yaml::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    /// Read `path` and resolve relative paths against its directory.
    pub fn load(path: &Path) -> DriverResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut file = Self::from_yaml(&text)?;
        if let Some(base) = path.parent() {
            file.resolve_paths(base);
        }
        Ok(file)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        fix(&mut self.fleet.time_matrix);
        fix(&mut self.fleet.answer_matrix);
        if let Some(p) = self.fleet.active_periods.as_mut() {
            fix(p);
        }
        fix(&mut self.output_dir);
    }

    /// Query list with payload scaling applied.
    pub fn query_specs(&self) -> Vec<QuerySpec> {
        if self.queries.is_empty() {
            return (0..BEIJING_PAYLOAD_MS.len())
                .map(|c| QuerySpec::new(c, DEFAULT_THRESHOLD, BEIJING_PAYLOAD_MS[c] * self.scale_query))
                .collect();
        }
        self.queries.iter().map(|q| q.spec(self.scale_query)).collect()
    }

    pub fn name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or("scenario")
    }

    fn validate(&self) -> DriverResult<()> {
        let positive = |what: &str, x: f64| {
            if x.is_finite() && x > 0.0 {
                Ok(())
            } else {
                Err(DriverError::Config(format!("{what} must be > 0, got {x}")))
            }
        };
        positive("fleet.scale_time", self.fleet.scale_time)?;
        positive("scale_query", self.scale_query)?;
        if self.trials == 0 {
            return Err(DriverError::Config("trials must be at least 1".into()));
        }
        if self.policies.is_empty() {
            return Err(DriverError::Config("no policies listed".into()));
        }
        if let ExperimentConfig::Estimation { thresholds, ground_truth } = &self.experiment {
            if thresholds.is_empty() || ground_truth.is_empty() {
                return Err(DriverError::Config("estimation needs thresholds and ground truth".into()));
            }
        }
        if let ExperimentConfig::Sweep { alphas, betas } = &self.experiment {
            if alphas.is_empty() || betas.is_empty() {
                return Err(DriverError::Config("sweep needs at least one alpha and one beta".into()));
            }
        }
        self.sim.validate()?;
        self.latency.build()?;
        Ok(())
    }
}

// ── serde defaults ────────────────────────────────────────────────────────────

fn one() -> f64 {
    1.0
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

fn default_latency_ms() -> f64 {
    DEFAULT_LATENCY_MS
}

fn default_gamma_shape() -> f64 {
    8.0
}

fn default_gamma_scale() -> f64 {
    5.0
}

fn default_gamma_location() -> f64 {
    20.0
}

fn default_estimation_thresholds() -> Vec<u32> {
    DEFAULT_ESTIMATION_THRESHOLDS.to_vec()
}

fn default_ground_truth() -> Vec<f64> {
    BEIJING_POSITIVE_RATE.to_vec()
}

fn default_policies() -> Vec<PolicyKind> {
    PolicyKind::all().to_vec()
}

fn default_trials() -> u32 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
