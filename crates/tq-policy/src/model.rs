//! The `ContactPolicy` trait — the extension point under evaluation.

use tq_core::{EventKind, QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

/// One answer delivered to a policy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Observation {
    pub query:   QueryId,
    pub vehicle: VehicleId,
    pub time:    SimTime,
    /// The vehicle's answer.
    pub positive: bool,
    /// On-board work the contact cost, as computed when it was queued (ms).
    pub work_ms: f64,
    /// `OnTimeAnswer` or `LateAnswer`.
    pub kind:    EventKind,
}

/// Pluggable contact-scheduling algorithm.
///
/// The engine owns time, vehicles, and the event queue; the policy owns its
/// candidate pools and bookkeeping and only decides *whom* to contact and
/// *when*.  Every vehicle a method returns is contacted immediately by the
/// engine at the current time.
///
/// # Contract
///
/// - Returning an empty batch is always valid.  Asking for vehicles from an
///   empty pool yields an empty batch, never an error.
/// - A policy must not return the same vehicle twice for the same query;
///   membership tracking is the policy's job, not the engine's.
/// - `timer_triggered` may be followed by a `LateAnswer` for the same
///   contact; policies must tolerate both.
/// - Randomness (pool shuffling, tie-breaks) comes only from the `SimRng`
///   passed in, so runs are reproducible.
///
/// # Example
///
/// ```rust,ignore
/// struct ContactNobody;
///
/// impl ContactPolicy for ContactNobody {
///     fn name(&self) -> &'static str { "nobody" }
///     fn init_pools(&mut self, _: &[VehicleId], _: &[QuerySpec], _: &mut SimRng) {}
///     fn first_batch(&mut self, _: QueryId, _: u32) -> Vec<VehicleId> { vec![] }
///     fn update(&mut self, _: Observation) {}
///     fn next_batch(&mut self, _: SimTime, _: QueryId, _: i64) -> Vec<VehicleId> { vec![] }
///     fn new_active_vehicle(&mut self, _: SimTime, _: VehicleId, _: &mut SimRng)
///         -> Vec<(QueryId, VehicleId)> { vec![] }
/// }
/// ```
pub trait ContactPolicy {
    /// Short identifier used in logs and output file names.
    fn name(&self) -> &'static str;

    /// One-time setup of per-query candidate structures from the vehicles
    /// connected at the starting time.  `queries[i]` is `QueryId(i)`.
    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng);

    /// Vehicles to contact at the starting time for `query`, whose
    /// threshold is `n`.
    fn first_batch(&mut self, query: QueryId, n: u32) -> Vec<VehicleId>;

    /// Record an answer.  Must accept any answer for any contact the policy
    /// issued, including late ones.
    fn update(&mut self, observation: Observation);

    /// Vehicles to contact now, given the query's current unmet demand
    /// (threshold minus positives; zero or negative once resolved).
    fn next_batch(&mut self, time: SimTime, query: QueryId, remaining: i64) -> Vec<VehicleId>;

    /// No on-time answer exists for this contact at its deadline.
    ///
    /// Default: ignored.
    fn timer_triggered(&mut self, _time: SimTime, _query: QueryId, _vehicle: VehicleId) {}

    /// `vehicle` just reconnected.  Update its pool memberships and return
    /// the `(query, vehicle)` pairs to contact immediately.
    fn new_active_vehicle(
        &mut self,
        time:    SimTime,
        vehicle: VehicleId,
        rng:     &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)>;
}

impl<P: ContactPolicy + ?Sized> ContactPolicy for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) {
        (**self).init_pools(active, queries, rng)
    }

    fn first_batch(&mut self, query: QueryId, n: u32) -> Vec<VehicleId> {
        (**self).first_batch(query, n)
    }

    fn update(&mut self, observation: Observation) {
        (**self).update(observation)
    }

    fn next_batch(&mut self, time: SimTime, query: QueryId, remaining: i64) -> Vec<VehicleId> {
        (**self).next_batch(time, query, remaining)
    }

    fn timer_triggered(&mut self, time: SimTime, query: QueryId, vehicle: VehicleId) {
        (**self).timer_triggered(time, query, vehicle)
    }

    fn new_active_vehicle(
        &mut self,
        time:    SimTime,
        vehicle: VehicleId,
        rng:     &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)> {
        (**self).new_active_vehicle(time, vehicle, rng)
    }
}
