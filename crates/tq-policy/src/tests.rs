//! Unit tests for tq-policy.

use tq_core::{EventKind, QueryId, SimRng, SimTime, VehicleId};
use tq_fleet::QuerySpec;

use crate::{ContactPolicy, Observation};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn vehicles(n: u32) -> Vec<VehicleId> {
    (0..n).map(VehicleId).collect()
}

fn specs(thresholds: &[u32]) -> Vec<QuerySpec> {
    thresholds.iter().enumerate().map(|(i, &n)| QuerySpec::new(i, n, 0.0)).collect()
}

fn obs(query: u32, vehicle: VehicleId, positive: bool, kind: EventKind) -> Observation {
    Observation {
        query: QueryId(query),
        vehicle,
        time: SimTime::from_secs(1.0),
        positive,
        work_ms: 0.0,
        kind,
    }
}

fn t(secs: f64) -> SimTime {
    SimTime::from_secs(secs)
}

// ── Pools ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool {
    use super::*;
    use crate::{CandidatePool, LoadKey, PriorityPool, QueryPools};

    #[test]
    fn candidate_pool_dedupes_and_pops_lifo() {
        let mut pool = CandidatePool::new();
        assert!(pool.push(VehicleId(1)));
        assert!(pool.push(VehicleId(2)));
        assert!(!pool.push(VehicleId(1)));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.pop(), Some(VehicleId(2)));
        assert_eq!(pool.pop(), Some(VehicleId(1)));
        assert_eq!(pool.pop(), None);
    }

    #[test]
    fn shuffled_pool_keeps_every_vehicle() {
        let mut rng = SimRng::new(3);
        let mut pool = CandidatePool::shuffled(&vehicles(20), &mut rng);
        let mut drained = pool.drain_all();
        drained.sort();
        assert_eq!(drained, vehicles(20));
        assert!(pool.is_empty());
    }

    #[test]
    fn take_marks_contacted_and_offer_refuses_them() {
        let mut rng = SimRng::new(1);
        let mut pools = QueryPools::new(&vehicles(3), &specs(&[1, 1]), &mut rng);
        let batch = pools.take(QueryId(0), 2);
        assert_eq!(batch.len(), 2);
        assert!(pools.ledger.contains(QueryId(0), batch[0]));
        assert!(!pools.ledger.contains(QueryId(1), batch[0]));
        assert!(!pools.offer(QueryId(0), batch[0]));
        assert_eq!(pools.pool_len(QueryId(0)), 1);
    }

    #[test]
    fn take_from_empty_pool_is_empty() {
        let mut rng = SimRng::new(1);
        let mut pools = QueryPools::new(&[], &specs(&[3]), &mut rng);
        assert!(pools.take(QueryId(0), 3).is_empty());
        assert!(pools.take_all(QueryId(0)).is_empty());
    }

    #[test]
    fn load_key_orders_in_flight_before_work() {
        let busy = LoadKey { in_flight: 1, work_ms: 0.0, tie: 0 };
        let worn = LoadKey { in_flight: 0, work_ms: 500.0, tie: 9 };
        let fresh = LoadKey { in_flight: 0, work_ms: 10.0, tie: 9 };
        assert!(worn < busy);
        assert!(fresh < worn);
        assert!(LoadKey::idle(1) < LoadKey::idle(2));
    }

    #[test]
    fn priority_pool_pops_least_loaded_and_rekeys() {
        let mut pool = PriorityPool::new();
        pool.insert(VehicleId(0), LoadKey::idle(5));
        pool.insert(VehicleId(1), LoadKey::idle(7));
        pool.rekey(VehicleId(0), LoadKey { in_flight: 1, work_ms: 0.0, tie: 5 });
        pool.rekey(VehicleId(9), LoadKey::idle(0));
        assert_eq!(pool.len(), 2);
        assert!(!pool.contains(VehicleId(9)));
        assert_eq!(pool.pop_min().map(|(v, _)| v), Some(VehicleId(1)));
        assert_eq!(pool.pop_min().map(|(v, _)| v), Some(VehicleId(0)));
        assert!(pool.is_empty());
    }
}

// ── Adaptive math ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod adaptive {
    use crate::{AdaptiveParams, AdaptiveStats, batch_size};

    fn stats(queried: u32, received: u32, positive: u32) -> AdaptiveStats {
        AdaptiveStats { queried, received, positive }
    }

    #[test]
    fn params_validation() {
        let d = AdaptiveParams::default();
        assert_eq!((d.alpha, d.beta), (1.25, 0.7));
        assert!(AdaptiveParams::new(0.5, 0.0).is_ok());
        assert!(AdaptiveParams::new(0.0, 0.5).is_err());
        assert!(AdaptiveParams::new(f64::NAN, 0.5).is_err());
        assert!(AdaptiveParams::new(1.0, 1.5).is_err());
    }

    #[test]
    fn idle_query_is_ready() {
        assert_eq!(stats(0, 0, 0).response_ratio(), 1.0);
        assert!(stats(0, 0, 0).is_ready(0.7));
        assert!(!stats(10, 6, 0).is_ready(0.7));
        assert!(stats(10, 7, 0).is_ready(0.7));
    }

    #[test]
    fn positive_rate_is_floored() {
        assert_eq!(stats(0, 0, 0).positive_rate_floor(), 1.0);
        assert_eq!(stats(4, 4, 0).positive_rate_floor(), 0.2);
        assert_eq!(stats(4, 4, 2).positive_rate_floor(), 0.5);
    }

    #[test]
    fn batch_covers_demand_at_observed_rate() {
        let params = AdaptiveParams::default();
        // p = 0.5, no futures: ceil(1.25 * 3 / 0.5) = 8
        assert_eq!(batch_size(&params, &stats(10, 10, 5), 3, 100), 8);
        assert_eq!(batch_size(&params, &stats(10, 10, 5), 3, 5), 5);
    }

    #[test]
    fn outstanding_contacts_cover_demand() {
        let params = AdaptiveParams::default();
        // p = 0.5, 8 futures expected to bring 4 positives for 3 needed.
        assert_eq!(batch_size(&params, &stats(10, 2, 1), 3, 100), 0);
        assert_eq!(batch_size(&params, &stats(10, 10, 5), 0, 100), 0);
    }

    #[test]
    fn unmet_demand_rounds_half_to_even() {
        let params = AdaptiveParams::new(1.0, 0.7).unwrap();
        // p = 0.5, one future: 3 - 0.5 = 2.5 rounds to 2, then 2 / 0.5 = 4.
        assert_eq!(batch_size(&params, &stats(2, 1, 0), 3, 100), 4);
    }
}

// ── Eager ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod eager {
    use super::*;
    use crate::EagerPolicy;

    #[test]
    fn first_batch_is_whole_pool() {
        let mut rng = SimRng::new(0);
        let mut p = EagerPolicy::new();
        p.init_pools(&vehicles(4), &specs(&[1]), &mut rng);
        let mut batch = p.first_batch(QueryId(0), 1);
        batch.sort();
        assert_eq!(batch, vehicles(4));
        assert!(p.first_batch(QueryId(0), 1).is_empty());
        assert!(p.next_batch(t(1.0), QueryId(0), 1).is_empty());
    }

    #[test]
    fn joining_vehicle_contacted_for_unmet_queries() {
        let mut rng = SimRng::new(0);
        let mut p = EagerPolicy::new();
        p.init_pools(&vehicles(2), &specs(&[1, 1]), &mut rng);
        let first = p.first_batch(QueryId(0), 1);
        p.update(obs(0, first[0], true, EventKind::OnTimeAnswer));

        let joined = p.new_active_vehicle(t(5.0), VehicleId(7), &mut rng);
        assert_eq!(joined, vec![(QueryId(1), VehicleId(7))]);
        assert!(p.new_active_vehicle(t(6.0), VehicleId(7), &mut rng).is_empty());
    }
}

// ── Lazy ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lazy {
    use super::*;
    use crate::LazyPolicy;

    fn started(n: u32, threshold: u32) -> (LazyPolicy, Vec<VehicleId>) {
        let mut rng = SimRng::new(11);
        let mut p = LazyPolicy::new();
        p.init_pools(&vehicles(n), &specs(&[threshold]), &mut rng);
        let first = p.first_batch(QueryId(0), threshold);
        (p, first)
    }

    #[test]
    fn first_batch_is_one_per_demand_unit() {
        let (p, first) = started(5, 2);
        assert_eq!(first.len(), 2);
        assert_eq!(p.outstanding(QueryId(0)), 2);
    }

    #[test]
    fn negative_on_time_answer_requests_replacement() {
        let (mut p, first) = started(5, 2);
        p.update(obs(0, first[0], false, EventKind::OnTimeAnswer));
        let next = p.next_batch(t(1.0), QueryId(0), 2);
        assert_eq!(next.len(), 1);
        assert!(!first.contains(&next[0]));
        assert_eq!(p.outstanding(QueryId(0)), 2);
        // The request is consumed by the batch it produced.
        assert!(p.next_batch(t(1.0), QueryId(0), 2).is_empty());
    }

    #[test]
    fn positive_or_late_answer_requests_nothing() {
        let (mut p, first) = started(5, 2);
        p.update(obs(0, first[0], true, EventKind::OnTimeAnswer));
        assert!(p.next_batch(t(1.0), QueryId(0), 1).is_empty());

        p.timer_triggered(t(1.0), QueryId(0), first[1]);
        assert_eq!(p.next_batch(t(1.0), QueryId(0), 1).len(), 1);
        p.update(obs(0, first[1], false, EventKind::LateAnswer));
        assert!(p.next_batch(t(1.2), QueryId(0), 1).is_empty());
    }

    #[test]
    fn joining_vehicle_contacted_only_when_idle() {
        let (mut p, _) = started(0, 1);
        assert_eq!(p.outstanding(QueryId(0)), 0);
        let mut rng = SimRng::new(0);
        let joined = p.new_active_vehicle(t(2.0), VehicleId(3), &mut rng);
        assert_eq!(joined, vec![(QueryId(0), VehicleId(3))]);

        // Busy now: the next joiner waits in the pool for a replacement request.
        assert!(p.new_active_vehicle(t(3.0), VehicleId(4), &mut rng).is_empty());
        p.timer_triggered(t(3.0), QueryId(0), VehicleId(3));
        assert_eq!(p.next_batch(t(3.0), QueryId(0), 1), vec![VehicleId(4)]);
    }
}

// ── Relay ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod relay {
    use super::*;
    use crate::RelayPolicy;

    #[test]
    fn one_more_contact_per_event_while_unmet() {
        let mut rng = SimRng::new(2);
        let mut p = RelayPolicy::new();
        p.init_pools(&vehicles(6), &specs(&[2]), &mut rng);
        assert_eq!(p.first_batch(QueryId(0), 2).len(), 2);
        assert_eq!(p.next_batch(t(1.0), QueryId(0), 2).len(), 1);
        assert_eq!(p.next_batch(t(1.0), QueryId(0), 1).len(), 1);
        assert!(p.next_batch(t(1.0), QueryId(0), 0).is_empty());
    }

    #[test]
    fn joining_vehicle_only_refills_pool() {
        let mut rng = SimRng::new(2);
        let mut p = RelayPolicy::new();
        p.init_pools(&[], &specs(&[1]), &mut rng);
        assert!(p.new_active_vehicle(t(1.0), VehicleId(5), &mut rng).is_empty());
        assert_eq!(p.next_batch(t(1.0), QueryId(0), 1), vec![VehicleId(5)]);
    }
}

// ── Balanced ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod balanced {
    use super::*;
    use crate::{AdaptiveParams, BalancedPolicy};

    fn started(n: u32, threshold: u32) -> (BalancedPolicy, Vec<VehicleId>) {
        let mut rng = SimRng::new(5);
        let mut p = BalancedPolicy::new(AdaptiveParams::default());
        p.init_pools(&vehicles(n), &specs(&[threshold]), &mut rng);
        let first = p.first_batch(QueryId(0), threshold);
        (p, first)
    }

    #[test]
    fn waits_for_beta_fraction() {
        let (mut p, first) = started(20, 2);
        assert_eq!(first.len(), 2);
        assert!(p.next_batch(t(0.5), QueryId(0), 2).is_empty());
        p.timer_triggered(t(1.0), QueryId(0), first[0]);
        // 1 of 2 settled < 0.7.
        assert!(p.next_batch(t(1.0), QueryId(0), 2).is_empty());
    }

    #[test]
    fn batch_sized_from_floored_rate() {
        let (mut p, first) = started(20, 2);
        p.timer_triggered(t(1.0), QueryId(0), first[0]);
        p.timer_triggered(t(1.0), QueryId(0), first[1]);
        // p = 1/3, no futures: ceil(1.25 * 2 * 3) = 8.
        let next = p.next_batch(t(1.0), QueryId(0), 2);
        assert_eq!(next.len(), 8);
        assert_eq!(p.stats(QueryId(0)).queried, 10);
    }

    #[test]
    fn late_answer_counts_positive_not_received() {
        let (mut p, first) = started(20, 2);
        p.timer_triggered(t(1.0), QueryId(0), first[0]);
        p.update(obs(0, first[0], true, EventKind::LateAnswer));
        let s = p.stats(QueryId(0));
        assert_eq!((s.received, s.positive), (1, 1));
    }

    #[test]
    fn joining_vehicle_is_contacted_when_ready() {
        let (mut p, first) = started(1, 1);
        p.update(obs(0, first[0], false, EventKind::OnTimeAnswer));
        assert!(p.next_batch(t(1.0), QueryId(0), 1).is_empty());
        let mut rng = SimRng::new(0);
        let joined = p.new_active_vehicle(t(2.0), VehicleId(9), &mut rng);
        assert_eq!(joined, vec![(QueryId(0), VehicleId(9))]);
    }

    #[test]
    fn same_seed_same_batches() {
        let (_, a) = started(50, 5);
        let (_, b) = started(50, 5);
        assert_eq!(a, b);
    }
}

// ── Fair ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fair {
    use super::*;
    use crate::{AdaptiveParams, FairPolicy};

    fn policy(n: u32, thresholds: &[u32]) -> FairPolicy {
        let mut rng = SimRng::new(8);
        let mut p = FairPolicy::new(AdaptiveParams::default());
        p.init_pools(&vehicles(n), &specs(thresholds), &mut rng);
        p
    }

    #[test]
    fn busy_vehicle_picked_last() {
        let mut p = policy(3, &[1, 2]);
        let a = p.first_batch(QueryId(0), 1);
        assert_eq!(p.load(a[0]).in_flight, 1);
        let b = p.first_batch(QueryId(1), 2);
        assert_eq!(b.len(), 2);
        assert!(!b.contains(&a[0]));
    }

    #[test]
    fn worked_vehicle_picked_after_fresh_one() {
        let mut p = policy(2, &[1, 1]);
        let a = p.first_batch(QueryId(0), 1)[0];
        let mut answer = obs(0, a, false, EventKind::OnTimeAnswer);
        answer.work_ms = 30.0;
        p.update(answer);
        assert_eq!(p.load(a).in_flight, 0);
        assert_eq!(p.load(a).work_ms, 30.0);

        let b = p.first_batch(QueryId(1), 1)[0];
        assert_ne!(a, b);
    }

    #[test]
    fn first_batch_capped_at_pool() {
        let mut p = policy(2, &[5]);
        assert_eq!(p.first_batch(QueryId(0), 5).len(), 2);
        assert!(p.first_batch(QueryId(0), 5).is_empty());
    }

    #[test]
    fn rejoining_vehicle_keeps_its_load() {
        let mut p = policy(1, &[1, 1]);
        let a = p.first_batch(QueryId(0), 1)[0];
        let mut rng = SimRng::new(0);
        // Query 1 has not started, so the vehicle is still in its pool.
        let joined = p.new_active_vehicle(t(4.0), a, &mut rng);
        assert_eq!(joined, vec![(QueryId(1), a)]);
        assert_eq!(p.load(a).in_flight, 2);
    }
}

// ── PolicyKind ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kind {
    use crate::PolicyKind;

    #[test]
    fn build_every_kind() {
        for kind in PolicyKind::all() {
            let policy = kind.build().unwrap();
            assert_eq!(policy.name(), kind.name());
        }
    }

    #[test]
    fn invalid_tunables_rejected() {
        assert!(PolicyKind::Balanced { alpha: -1.0, beta: 0.5 }.build().is_err());
        assert!(PolicyKind::Fair { alpha: 1.0, beta: 2.0 }.build().is_err());
    }
}
