//! `LazyPolicy` — one replacement contact at a time.

use tq_core::{EventKind, QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

use crate::model::{ContactPolicy, Observation};
use crate::pool::QueryPools;

/// Contacts one vehicle per unit of demand at the start, then one new vehicle
/// whenever a contact fails: an on-time negative answer or an expired timer.
/// Timers count as negatives, so late answers never trigger a replacement.
#[derive(Clone, Debug, Default)]
pub struct LazyPolicy {
    pools:       QueryPools,
    /// Contacts issued but neither answered on time nor timed out.
    outstanding: Vec<u32>,
    /// Set by the last event of a query that calls for a replacement.
    replace:     Vec<bool>,
}

impl LazyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self, query: QueryId) -> u32 {
        self.outstanding[query.index()]
    }

    fn settle(&mut self, query: QueryId) {
        let slot = &mut self.outstanding[query.index()];
        *slot = slot.saturating_sub(1);
    }
}

impl ContactPolicy for LazyPolicy {
    fn name(&self) -> &'static str {
        "lazy"
    }

    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) {
        self.pools = QueryPools::new(active, queries, rng);
        self.outstanding = vec![0; queries.len()];
        self.replace = vec![false; queries.len()];
    }

    fn first_batch(&mut self, query: QueryId, n: u32) -> Vec<VehicleId> {
        let batch = self.pools.take(query, n as usize);
        self.outstanding[query.index()] += batch.len() as u32;
        batch
    }

    fn update(&mut self, obs: Observation) {
        self.pools.ledger.record_answer(obs.query, obs.positive);
        let on_time = obs.kind == EventKind::OnTimeAnswer;
        if on_time {
            self.settle(obs.query);
        }
        self.replace[obs.query.index()] = on_time && !obs.positive;
    }

    fn timer_triggered(&mut self, _time: SimTime, query: QueryId, _vehicle: VehicleId) {
        self.settle(query);
        self.replace[query.index()] = true;
    }

    fn next_batch(&mut self, _time: SimTime, query: QueryId, _remaining: i64) -> Vec<VehicleId> {
        let wanted = std::mem::take(&mut self.replace[query.index()]);
        if !wanted || !self.pools.ledger.unmet(query) {
            return Vec::new();
        }
        let batch = self.pools.take(query, 1);
        self.outstanding[query.index()] += batch.len() as u32;
        batch
    }

    fn new_active_vehicle(
        &mut self,
        _time:   SimTime,
        vehicle: VehicleId,
        _rng:    &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)> {
        let mut to_contact = Vec::new();
        for q in self.pools.ledger.query_ids() {
            if self.pools.ledger.contains(q, vehicle) {
                continue;
            }
            if self.pools.ledger.unmet(q) && self.outstanding[q.index()] == 0 {
                self.pools.ledger.mark(q, vehicle);
                self.outstanding[q.index()] += 1;
                to_contact.push((q, vehicle));
            } else {
                self.pools.offer(q, vehicle);
            }
        }
        to_contact
    }
}
