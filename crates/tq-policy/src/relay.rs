//! `RelayPolicy` — one more contact after every event.

use tq_core::{QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

use crate::model::{ContactPolicy, Observation};
use crate::pool::QueryPools;

/// Starts like [`LazyPolicy`](crate::LazyPolicy) but contacts one new vehicle
/// after any event of a query that is still short of its threshold,
/// whatever the answer was.  Joining vehicles only refill the pools.
#[derive(Clone, Debug, Default)]
pub struct RelayPolicy {
    pools: QueryPools,
}

impl RelayPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactPolicy for RelayPolicy {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) {
        self.pools = QueryPools::new(active, queries, rng);
    }

    fn first_batch(&mut self, query: QueryId, n: u32) -> Vec<VehicleId> {
        self.pools.take(query, n as usize)
    }

    fn update(&mut self, obs: Observation) {
        self.pools.ledger.record_answer(obs.query, obs.positive);
    }

    fn next_batch(&mut self, _time: SimTime, query: QueryId, remaining: i64) -> Vec<VehicleId> {
        if remaining > 0 {
            self.pools.take(query, 1)
        } else {
            Vec::new()
        }
    }

    fn new_active_vehicle(
        &mut self,
        _time:   SimTime,
        vehicle: VehicleId,
        _rng:    &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)> {
        for q in self.pools.ledger.query_ids() {
            if self.pools.ledger.unmet(q) {
                self.pools.offer(q, vehicle);
            }
        }
        Vec::new()
    }
}
