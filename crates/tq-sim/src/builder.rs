//! Fluent builder for constructing a [`Sim`].

use tq_core::{FixedLatency, LatencyModel, SimConfig, SimRng};
use tq_fleet::{Connectivity, FleetData, MatrixOracle, QueryOracle, QuerySpec, QueryState, Vehicle};
use tq_policy::ContactPolicy;

use crate::{EventQueue, Sim, SimError, SimResult};

/// One-way latency used when none is supplied, in ms.
pub const DEFAULT_LATENCY_MS: f64 = 50.0;

/// Fluent builder for [`Sim<P, O>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — starting/ending time, timer duration, seed
/// - one [`Connectivity`] per vehicle, in oracle row order
/// - the queries to run
/// - `P: ContactPolicy` — the policy under test
/// - `O: QueryOracle` — work and answer generator
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                           |
/// |---------------|-----------------------------------|
/// | `.latency(m)` | `FixedLatency(50.0)`              |
///
/// # Example
///
/// ```rust,ignore
/// let data = load_fleet(&paths)?;
/// let mut sim = SimBuilder::from_fleet(config, data, queries, BalancedPolicy::default())
///     .latency(GammaLatency::mobile_4g()?)
///     .build()?;
/// let outcome = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<P: ContactPolicy, O: QueryOracle> {
    config:       SimConfig,
    connectivity: Vec<Connectivity>,
    queries:      Vec<QuerySpec>,
    policy:       P,
    oracle:       O,
    latency:      Option<Box<dyn LatencyModel>>,
}

impl<P: ContactPolicy, O: QueryOracle> SimBuilder<P, O> {
    pub fn new(
        config:       SimConfig,
        connectivity: Vec<Connectivity>,
        queries:      Vec<QuerySpec>,
        policy:       P,
        oracle:       O,
    ) -> Self {
        Self { config, connectivity, queries, policy, oracle, latency: None }
    }

    /// Latency source, sampled once per contact.
    pub fn latency<L: LatencyModel + 'static>(mut self, model: L) -> Self {
        self.latency = Some(Box::new(model));
        self
    }

    /// Same as [`latency`](Self::latency) for an already boxed model.
    pub fn boxed_latency(mut self, model: Box<dyn LatencyModel>) -> Self {
        self.latency = Some(model);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<P, O>> {
        self.config.validate()?;

        let vehicle_count = self.oracle.vehicle_count();
        if self.connectivity.len() != vehicle_count {
            return Err(SimError::VehicleCountMismatch {
                expected: vehicle_count,
                got:      self.connectivity.len(),
                what:     "connectivity list",
            });
        }

        let columns = self.oracle.column_count();
        for (i, q) in self.queries.iter().enumerate() {
            if q.column >= columns {
                return Err(SimError::Config(format!(
                    "query {i} reads column {} but the oracle has {columns}",
                    q.column
                )));
            }
            if !q.payload_ms.is_finite() || q.payload_ms < 0.0 {
                return Err(SimError::Config(format!(
                    "query {i} has invalid payload time {} ms",
                    q.payload_ms
                )));
            }
        }

        let start = self.config.start();
        let mut root = SimRng::new(self.config.seed);
        let rng = root.child(1);
        let policy_rng = root.child(2);

        Ok(Sim {
            clock:      start,
            vehicles:   Vehicle::fleet(self.connectivity, start),
            queries:    self.queries.into_iter().map(QueryState::new).collect(),
            policy:     self.policy,
            oracle:     self.oracle,
            latency:    self.latency.unwrap_or_else(|| Box::new(FixedLatency(DEFAULT_LATENCY_MS))),
            rng,
            policy_rng,
            events:     EventQueue::new(),
            dispatched: 0,
            ran:        false,
            config:     self.config,
        })
    }
}

impl<P: ContactPolicy> SimBuilder<P, MatrixOracle> {
    /// Builder over loaded fleet data: its windows and its matrix oracle.
    pub fn from_fleet(config: SimConfig, data: FleetData, queries: Vec<QuerySpec>, policy: P) -> Self {
        Self::new(config, data.connectivity, queries, policy, data.oracle)
    }
}
