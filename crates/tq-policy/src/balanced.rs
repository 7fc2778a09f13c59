//! `BalancedPolicy` — adaptive batches sized from the observed positive rate.

use tq_core::{EventKind, QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

use crate::adaptive::{AdaptiveParams, AdaptiveStats, batch_size};
use crate::model::{ContactPolicy, Observation};
use crate::pool::QueryPools;

/// Waits until a `beta` fraction of a query's contacts has settled, then
/// issues a batch large enough to cover the unmet demand at the observed
/// positive rate, inflated by `alpha`.  Candidates are drawn at random.
///
/// A contact settles on its on-time answer or on its timer; a late answer
/// after a timer only adds to the positive count.
#[derive(Clone, Debug, Default)]
pub struct BalancedPolicy {
    params: AdaptiveParams,
    pools:  QueryPools,
    stats:  Vec<AdaptiveStats>,
}

impl BalancedPolicy {
    pub fn new(params: AdaptiveParams) -> Self {
        Self { params, ..Self::default() }
    }

    pub fn params(&self) -> AdaptiveParams {
        self.params
    }

    pub fn stats(&self, query: QueryId) -> AdaptiveStats {
        self.stats[query.index()]
    }

    fn take(&mut self, query: QueryId, n: usize) -> Vec<VehicleId> {
        let batch = self.pools.take(query, n);
        self.stats[query.index()].queried += batch.len() as u32;
        batch
    }
}

impl ContactPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) {
        self.pools = QueryPools::new(active, queries, rng);
        self.stats = vec![AdaptiveStats::default(); queries.len()];
    }

    fn first_batch(&mut self, query: QueryId, n: u32) -> Vec<VehicleId> {
        self.take(query, n as usize)
    }

    fn update(&mut self, obs: Observation) {
        self.pools.ledger.record_answer(obs.query, obs.positive);
        let stats = &mut self.stats[obs.query.index()];
        if obs.kind == EventKind::OnTimeAnswer {
            stats.received += 1;
        }
        if obs.positive {
            stats.positive += 1;
        }
    }

    fn timer_triggered(&mut self, _time: SimTime, query: QueryId, _vehicle: VehicleId) {
        self.stats[query.index()].received += 1;
    }

    fn next_batch(&mut self, _time: SimTime, query: QueryId, remaining: i64) -> Vec<VehicleId> {
        let pool_len = self.pools.pool_len(query);
        let stats = self.stats[query.index()];
        if !self.pools.ledger.unmet(query) || pool_len == 0 || !stats.is_ready(self.params.beta) {
            return Vec::new();
        }
        let n = batch_size(&self.params, &stats, remaining, pool_len);
        self.take(query, n)
    }

    fn new_active_vehicle(
        &mut self,
        time:    SimTime,
        vehicle: VehicleId,
        _rng:    &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)> {
        for q in self.pools.ledger.query_ids() {
            if self.pools.ledger.unmet(q) {
                self.pools.offer(q, vehicle);
            }
        }
        let mut to_contact = Vec::new();
        for q in self.pools.ledger.query_ids() {
            let remaining = self.pools.ledger.remaining(q);
            to_contact.extend(self.next_batch(time, q, remaining).into_iter().map(|v| (q, v)));
        }
        to_contact
    }
}
