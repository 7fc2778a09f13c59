//! `EagerPolicy` — contact every candidate at once.

use tq_core::{QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

use crate::model::{ContactPolicy, Observation};
use crate::pool::QueryPools;

/// Sends each query to its whole pool at the start, ignores timers, and
/// contacts every joining vehicle for every query still short of its
/// threshold.  Fastest to resolve, most work.
#[derive(Clone, Debug, Default)]
pub struct EagerPolicy {
    pools: QueryPools,
}

impl EagerPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactPolicy for EagerPolicy {
    fn name(&self) -> &'static str {
        "eager"
    }

    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) {
        self.pools = QueryPools::new(active, queries, rng);
    }

    fn first_batch(&mut self, query: QueryId, _n: u32) -> Vec<VehicleId> {
        self.pools.take_all(query)
    }

    fn update(&mut self, obs: Observation) {
        self.pools.ledger.record_answer(obs.query, obs.positive);
    }

    fn next_batch(&mut self, _time: SimTime, _query: QueryId, _remaining: i64) -> Vec<VehicleId> {
        Vec::new()
    }

    fn new_active_vehicle(
        &mut self,
        _time:   SimTime,
        vehicle: VehicleId,
        _rng:    &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)> {
        let ledger = &mut self.pools.ledger;
        ledger
            .query_ids()
            .filter(|&q| ledger.unmet(q) && ledger.mark(q, vehicle))
            .map(|q| (q, vehicle))
            .collect()
    }
}
