//! `FairPolicy` — balanced batch sizes, least-loaded vehicles first.

use std::collections::HashMap;

use tq_core::{EventKind, QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

use crate::adaptive::{AdaptiveParams, AdaptiveStats, batch_size};
use crate::model::{ContactPolicy, Observation};
use crate::pool::{ContactLedger, Hasher, LoadKey, PriorityPool};

/// Fleet-wide load of one vehicle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VehicleLoad {
    /// Contacts sent to the vehicle and not yet answered.
    pub in_flight: u32,
    /// Work observed in its answers, ms.
    pub work_ms:   f64,
}

/// Sizes batches like [`BalancedPolicy`](crate::BalancedPolicy) but picks
/// vehicles in ascending `(in_flight, work_ms, random)` order, spreading load
/// over the fleet instead of optimising purely for speed.
///
/// The load of a vehicle is shared by all queries: contacting it for one
/// query moves it back in every other query's pool.  A vehicle that rejoins
/// keeps its accumulated load.
#[derive(Clone, Debug, Default)]
pub struct FairPolicy {
    params: AdaptiveParams,
    pools:  Vec<PriorityPool>,
    ledger: ContactLedger,
    loads:  HashMap<VehicleId, VehicleLoad, Hasher>,
    stats:  Vec<AdaptiveStats>,
}

impl FairPolicy {
    pub fn new(params: AdaptiveParams) -> Self {
        Self { params, ..Self::default() }
    }

    pub fn load(&self, vehicle: VehicleId) -> VehicleLoad {
        self.loads.get(&vehicle).copied().unwrap_or_default()
    }

    pub fn stats(&self, query: QueryId) -> AdaptiveStats {
        self.stats[query.index()]
    }

    fn key_for(&self, vehicle: VehicleId, tie: u64) -> LoadKey {
        let load = self.load(vehicle);
        LoadKey { in_flight: load.in_flight, work_ms: load.work_ms, tie }
    }

    /// Propagate a load change to every pool holding `vehicle`.
    fn rekey_everywhere(&mut self, vehicle: VehicleId) {
        let load = self.load(vehicle);
        for pool in &mut self.pools {
            if let Some(old) = pool.key_of(vehicle) {
                pool.rekey(vehicle, LoadKey { in_flight: load.in_flight, work_ms: load.work_ms, tie: old.tie });
            }
        }
    }

    fn pick(&mut self, query: QueryId, n: usize) -> Vec<VehicleId> {
        let mut batch = Vec::with_capacity(n.min(self.pools[query.index()].len()));
        while batch.len() < n {
            let Some((vehicle, _)) = self.pools[query.index()].pop_min() else { break };
            if !self.ledger.mark(query, vehicle) {
                continue;
            }
            self.loads.entry(vehicle).or_default().in_flight += 1;
            self.rekey_everywhere(vehicle);
            batch.push(vehicle);
        }
        self.stats[query.index()].queried += batch.len() as u32;
        batch
    }
}

impl ContactPolicy for FairPolicy {
    fn name(&self) -> &'static str {
        "fair"
    }

    fn init_pools(&mut self, active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) {
        self.ledger = ContactLedger::new(queries);
        self.stats = vec![AdaptiveStats::default(); queries.len()];
        self.loads.clear();
        self.pools = queries
            .iter()
            .map(|_| {
                let mut pool = PriorityPool::new();
                for &v in active {
                    pool.insert(v, LoadKey::idle(rng.random()));
                }
                pool
            })
            .collect();
    }

    fn first_batch(&mut self, query: QueryId, n: u32) -> Vec<VehicleId> {
        self.pick(query, n as usize)
    }

    fn update(&mut self, obs: Observation) {
        self.ledger.record_answer(obs.query, obs.positive);
        let stats = &mut self.stats[obs.query.index()];
        if obs.kind == EventKind::OnTimeAnswer {
            stats.received += 1;
        }
        if obs.positive {
            stats.positive += 1;
        }
        let load = self.loads.entry(obs.vehicle).or_default();
        load.in_flight = load.in_flight.saturating_sub(1);
        load.work_ms += obs.work_ms;
        self.rekey_everywhere(obs.vehicle);
    }

    fn timer_triggered(&mut self, _time: SimTime, query: QueryId, _vehicle: VehicleId) {
        self.stats[query.index()].received += 1;
    }

    fn next_batch(&mut self, _time: SimTime, query: QueryId, remaining: i64) -> Vec<VehicleId> {
        let pool_len = self.pools[query.index()].len();
        let stats = self.stats[query.index()];
        if !self.ledger.unmet(query) || pool_len == 0 || !stats.is_ready(self.params.beta) {
            return Vec::new();
        }
        let n = batch_size(&self.params, &stats, remaining, pool_len);
        self.pick(query, n)
    }

    fn new_active_vehicle(
        &mut self,
        time:    SimTime,
        vehicle: VehicleId,
        rng:     &mut SimRng,
    ) -> Vec<(QueryId, VehicleId)> {
        for q in self.ledger.query_ids() {
            let pooled = self.pools[q.index()].contains(vehicle);
            if self.ledger.unmet(q) && !pooled && !self.ledger.contains(q, vehicle) {
                let key = self.key_for(vehicle, rng.random());
                self.pools[q.index()].insert(vehicle, key);
            }
        }
        let mut to_contact = Vec::new();
        for q in self.ledger.query_ids() {
            let remaining = self.ledger.remaining(q);
            to_contact.extend(self.next_batch(time, q, remaining).into_iter().map(|v| (q, v)));
        }
        to_contact
    }
}
