//! `tq-driver` — scenario files, repeated trials, and experiments.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`config`]      | `ScenarioFile` (YAML), latency / experiment selectors      |
//! | [`scenario`]    | `Scenario`: loaded fleet + queries, one-shot simulation    |
//! | [`runner`]      | `run_trials`, `TrialSet`                                   |
//! | [`experiments`] | Alpha/beta sweep, estimation error, fairness, `execute`   |
//! | [`stats`]       | Mean and sample standard deviation                         |
//! | [`error`]       | `DriverError`, `DriverResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                         |
//! |------------|------------------------------------------------|
//! | `parallel` | Trials of a batch run on Rayon's thread pool.  |
//!
//! # Quick start
//!
//! ```rust,ignore
//! let file = ScenarioFile::load(Path::new("scenario.yaml"))?;
//! let scenario = Scenario::from_file(&file)?;
//! let set = run_trials(&scenario, &PolicyKind::balanced(), 100)?;
//! println!("{:.2} ms", set.mean_max_resolution_ms());
//! ```

pub mod config;
pub mod error;
pub mod experiments;
pub mod runner;
pub mod scenario;
pub mod stats;


pub use config::{
    BEIJING_PAYLOAD_MS, BEIJING_POSITIVE_RATE, DEFAULT_ESTIMATION_THRESHOLDS, DEFAULT_THRESHOLD,
    ExperimentConfig, FleetConfig, LatencyConfig, QueryConfig, ScenarioFile, ScenarioMeta,
};
pub use error::{DriverError, DriverResult};
pub use experiments::{
    FairnessReport, SweepPoint, alpha_beta_sweep, estimation_errors, execute, fairness, policy_label,
};
pub use runner::{TrialSet, run_trials};
pub use scenario::Scenario;
