//! Candidate pools and contact bookkeeping shared by the policies.
//!
//! - [`CandidatePool`]: insertion-ordered vehicle set, popped LIFO.
//! - [`ContactLedger`]: per-query contacted sets and unmet demand.
//! - [`QueryPools`]: one shuffled `CandidatePool` per query plus a ledger.
//! - [`PriorityPool`]: vehicles ordered by [`LoadKey`], least loaded first.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexSet;
use tq_core::{QueryId, SimRng, VehicleId};
use tq_fleet::QuerySpec;

#[cfg(feature = "fx-hash")]
pub type Hasher = rustc_hash::FxBuildHasher;
#[cfg(not(feature = "fx-hash"))]
pub type Hasher = std::collections::hash_map::RandomState;

pub type VehicleSet = HashSet<VehicleId, Hasher>;

// ── CandidatePool ─────────────────────────────────────────────────────────────

/// Vehicles still eligible for one query.
///
/// Duplicates are ignored on push; `pop` removes the most recently pushed
/// vehicle, so a pool built from a shuffled list is consumed in random order.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    order: IndexSet<VehicleId, Hasher>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool holding `vehicles` in a random order drawn from `rng`.
    pub fn shuffled(vehicles: &[VehicleId], rng: &mut SimRng) -> Self {
        let mut list = vehicles.to_vec();
        rng.shuffle(&mut list);
        let mut pool = Self::new();
        pool.order.extend(list);
        pool
    }

    /// Returns `false` if the vehicle was already pooled.
    pub fn push(&mut self, vehicle: VehicleId) -> bool {
        self.order.insert(vehicle)
    }

    pub fn pop(&mut self) -> Option<VehicleId> {
        self.order.pop()
    }

    /// Remove every pooled vehicle, last pushed first.
    pub fn drain_all(&mut self) -> Vec<VehicleId> {
        let mut out: Vec<VehicleId> = self.order.drain(..).collect();
        out.reverse();
        out
    }

    pub fn contains(&self, vehicle: VehicleId) -> bool {
        self.order.contains(&vehicle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ── ContactLedger ─────────────────────────────────────────────────────────────

/// Which vehicles each query has contacted, and how many positives it still
/// needs as far as the policy has observed.
#[derive(Clone, Debug, Default)]
pub struct ContactLedger {
    contacted: Vec<VehicleSet>,
    remaining: Vec<i64>,
}

impl ContactLedger {
    pub fn new(queries: &[QuerySpec]) -> Self {
        Self {
            contacted: queries.iter().map(|_| VehicleSet::default()).collect(),
            remaining: queries.iter().map(|q| q.threshold as i64).collect(),
        }
    }

    /// Returns `false` if `vehicle` was already contacted for `query`.
    pub fn mark(&mut self, query: QueryId, vehicle: VehicleId) -> bool {
        self.contacted[query.index()].insert(vehicle)
    }

    pub fn contains(&self, query: QueryId, vehicle: VehicleId) -> bool {
        self.contacted[query.index()].contains(&vehicle)
    }

    pub fn contacted_count(&self, query: QueryId) -> usize {
        self.contacted[query.index()].len()
    }

    pub fn record_answer(&mut self, query: QueryId, positive: bool) {
        if positive {
            self.remaining[query.index()] -= 1;
        }
    }

    pub fn remaining(&self, query: QueryId) -> i64 {
        self.remaining[query.index()]
    }

    /// `true` while the query still lacks positives.
    pub fn unmet(&self, query: QueryId) -> bool {
        self.remaining(query) > 0
    }

    pub fn query_count(&self) -> usize {
        self.remaining.len()
    }

    pub fn query_ids(&self) -> impl Iterator<Item = QueryId> + use<> {
        (0..self.remaining.len() as u32).map(QueryId)
    }
}

// ── QueryPools ────────────────────────────────────────────────────────────────

/// One independently shuffled candidate pool per query.
#[derive(Clone, Debug, Default)]
pub struct QueryPools {
    pub pools:  Vec<CandidatePool>,
    pub ledger: ContactLedger,
}

impl QueryPools {
    pub fn new(active: &[VehicleId], queries: &[QuerySpec], rng: &mut SimRng) -> Self {
        Self {
            pools:  queries.iter().map(|_| CandidatePool::shuffled(active, rng)).collect(),
            ledger: ContactLedger::new(queries),
        }
    }

    /// Pop up to `n` vehicles for `query` and mark them contacted.
    pub fn take(&mut self, query: QueryId, n: usize) -> Vec<VehicleId> {
        let pool = &mut self.pools[query.index()];
        let mut batch = Vec::with_capacity(n.min(pool.len()));
        while batch.len() < n {
            let Some(v) = pool.pop() else { break };
            if self.ledger.mark(query, v) {
                batch.push(v);
            }
        }
        batch
    }

    /// Empty the pool of `query`, marking every vehicle contacted.
    pub fn take_all(&mut self, query: QueryId) -> Vec<VehicleId> {
        let drained = self.pools[query.index()].drain_all();
        drained.into_iter().filter(|&v| self.ledger.mark(query, v)).collect()
    }

    /// Add `vehicle` to the pool of `query` unless it was already contacted
    /// for it.  Returns `true` if the pool grew.
    pub fn offer(&mut self, query: QueryId, vehicle: VehicleId) -> bool {
        !self.ledger.contains(query, vehicle) && self.pools[query.index()].push(vehicle)
    }

    pub fn pool_len(&self, query: QueryId) -> usize {
        self.pools[query.index()].len()
    }
}

// ── PriorityPool ──────────────────────────────────────────────────────────────

/// Load of one vehicle as seen by the fair policy.  Ordered by in-flight
/// contacts, then accumulated work, then a random tie-break.
#[derive(Copy, Clone, Debug)]
pub struct LoadKey {
    pub in_flight: u32,
    pub work_ms:   f64,
    pub tie:       u64,
}

impl LoadKey {
    pub fn idle(tie: u64) -> Self {
        Self { in_flight: 0, work_ms: 0.0, tie }
    }
}

impl PartialEq for LoadKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for LoadKey {}

impl PartialOrd for LoadKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LoadKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.in_flight
            .cmp(&other.in_flight)
            .then(self.work_ms.total_cmp(&other.work_ms))
            .then(self.tie.cmp(&other.tie))
    }
}

/// Indexed min-priority set of vehicles keyed by `LoadKey`.
///
/// `rekey` is O(log n): the old entry is located through the side index
/// rather than by scanning.
#[derive(Clone, Debug, Default)]
pub struct PriorityPool {
    ordered: BTreeSet<(LoadKey, VehicleId)>,
    keys:    HashMap<VehicleId, LoadKey, Hasher>,
}

impl PriorityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `vehicle` with `key`, replacing any previous key.
    pub fn insert(&mut self, vehicle: VehicleId, key: LoadKey) {
        if let Some(old) = self.keys.insert(vehicle, key) {
            self.ordered.remove(&(old, vehicle));
        }
        self.ordered.insert((key, vehicle));
    }

    pub fn remove(&mut self, vehicle: VehicleId) -> Option<LoadKey> {
        let key = self.keys.remove(&vehicle)?;
        self.ordered.remove(&(key, vehicle));
        Some(key)
    }

    /// Remove and return the least-loaded vehicle.
    pub fn pop_min(&mut self) -> Option<(VehicleId, LoadKey)> {
        let (key, vehicle) = self.ordered.pop_first()?;
        self.keys.remove(&vehicle);
        Some((vehicle, key))
    }

    /// Replace the key of a pooled vehicle.  No-op if it is not pooled.
    pub fn rekey(&mut self, vehicle: VehicleId, key: LoadKey) {
        if self.keys.contains_key(&vehicle) {
            self.insert(vehicle, key);
        }
    }

    pub fn key_of(&self, vehicle: VehicleId) -> Option<LoadKey> {
        self.keys.get(&vehicle).copied()
    }

    pub fn contains(&self, vehicle: VehicleId) -> bool {
        self.keys.contains_key(&vehicle)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
