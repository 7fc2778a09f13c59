//! `Scenario` — a loaded fleet plus everything needed to run it.

use tq_core::SimConfig;
use tq_fleet::{FleetData, QueryOracle, QuerySpec, load_fleet};
use tq_policy::PolicyKind;
use tq_sim::{NoopObserver, SimBuilder, SimObserver, SimOutcome};

use crate::{DriverError, DriverResult, LatencyConfig, ScenarioFile};

/// Immutable run inputs; shared by every trial of a batch.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name:    String,
    pub fleet:   FleetData,
    pub queries: Vec<QuerySpec>,
    pub sim:     SimConfig,
    pub latency: LatencyConfig,
}

impl Scenario {
    pub fn new(
        name:    impl Into<String>,
        fleet:   FleetData,
        queries: Vec<QuerySpec>,
        sim:     SimConfig,
        latency: LatencyConfig,
    ) -> Self {
        Self { name: name.into(), fleet, queries, sim, latency }
    }

    /// Load the fleet files named by `file` and apply its scaling factors.
    /// `scale_time` stretches both the work matrix and the reply timer.
    pub fn from_file(file: &ScenarioFile) -> DriverResult<Self> {
        let scale_time = file.fleet.scale_time;
        let mut fleet = load_fleet(&file.fleet.paths())?;
        fleet.oracle = fleet.oracle.with_scale_time(scale_time);
        let sim = SimConfig {
            timer_duration_ms: file.sim.timer_duration_ms * scale_time,
            ..file.sim.clone()
        };
        let scenario = Self::new(file.name(), fleet, file.query_specs(), sim, file.latency.clone());
        scenario.check_columns(&scenario.queries)?;
        Ok(scenario)
    }

    pub fn vehicle_count(&self) -> usize {
        self.fleet.vehicle_count()
    }

    /// One simulation of `kind` with the scenario's own queries.
    pub fn simulate(&self, kind: &PolicyKind, seed: u64) -> DriverResult<SimOutcome> {
        self.simulate_observed(kind, seed, &self.queries, &mut NoopObserver)
    }

    /// One simulation with a replacement query list.
    pub fn simulate_queries(
        &self,
        kind:    &PolicyKind,
        seed:    u64,
        queries: &[QuerySpec],
    ) -> DriverResult<SimOutcome> {
        self.simulate_observed(kind, seed, queries, &mut NoopObserver)
    }

    pub fn simulate_observed<Obs: SimObserver>(
        &self,
        kind:     &PolicyKind,
        seed:     u64,
        queries:  &[QuerySpec],
        observer: &mut Obs,
    ) -> DriverResult<SimOutcome> {
        let config = SimConfig { seed, ..self.sim.clone() };
        let mut sim = SimBuilder::new(
            config,
            self.fleet.connectivity.clone(),
            queries.to_vec(),
            kind.build()?,
            &self.fleet.oracle,
        )
        .boxed_latency(self.latency.build()?)
        .build()?;
        Ok(sim.run(observer)?)
    }

    pub(crate) fn check_columns(&self, queries: &[QuerySpec]) -> DriverResult<()> {
        let columns = self.fleet.oracle.column_count();
        match queries.iter().find(|q| q.column >= columns) {
            Some(q) => Err(DriverError::Config(format!(
                "query column {} out of range: fleet has {columns} columns",
                q.column
            ))),
            None => Ok(()),
        }
    }
}
