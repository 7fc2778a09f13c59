//! Unit tests for tq-fleet.

use std::io::Cursor;

use tq_core::{SimTime, VehicleId};

use crate::{ActivePeriod, Connectivity, FleetError, QuerySpec, QueryState, Vehicle};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Two windows: 10–20 s and 30–40 s.
fn two_windows() -> Connectivity {
    Connectivity::new(vec![ActivePeriod::new(10.0, 20.0), ActivePeriod::new(30.0, 40.0)], 0)
        .unwrap()
}

// ── Connectivity ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod connectivity {
    use super::*;

    #[test]
    fn lookup_inside_and_on_bounds() {
        let c = two_windows();
        assert_eq!(c.period_at(SimTime(10.0)), Some(&ActivePeriod::new(10.0, 20.0)));
        assert_eq!(c.period_at(SimTime(15.0)), Some(&ActivePeriod::new(10.0, 20.0)));
        assert_eq!(c.period_at(SimTime(20.0)), Some(&ActivePeriod::new(10.0, 20.0)));
        assert_eq!(c.period_at(SimTime(35.0)), Some(&ActivePeriod::new(30.0, 40.0)));
    }

    #[test]
    fn lookup_in_gaps() {
        let c = two_windows();
        assert!(!c.is_active(SimTime(5.0)));
        assert!(!c.is_active(SimTime(25.0)));
        assert!(!c.is_active(SimTime(40.5)));
    }

    #[test]
    fn touching_periods_resolve_to_earlier() {
        let c = Connectivity::new(
            vec![ActivePeriod::new(0.0, 10.0), ActivePeriod::new(10.0, 20.0)],
            0,
        )
        .unwrap();
        assert_eq!(c.period_at(SimTime(10.0)).unwrap().start, SimTime(0.0));
    }

    #[test]
    fn rejects_overlap_and_empty_periods() {
        let overlap = Connectivity::new(
            vec![ActivePeriod::new(0.0, 10.0), ActivePeriod::new(5.0, 20.0)],
            3,
        );
        assert!(matches!(overlap, Err(FleetError::InvalidPeriods { vehicle: 3, .. })));

        let backwards = Connectivity::new(vec![ActivePeriod::new(10.0, 10.0)], 0);
        assert!(backwards.is_err());
    }

    #[test]
    fn all_day_covers_the_day() {
        let c = Connectivity::all_day();
        assert!(c.is_active(SimTime(0.0)));
        assert!(c.is_active(SimTime(86_400.0)));
        assert!(!c.is_active(SimTime(86_400.1)));
        assert_eq!(c.active_secs(), 86_400.0);
    }

    #[test]
    fn joins_after_respects_start_and_horizon() {
        let c = Connectivity::new(
            vec![
                ActivePeriod::new(0.0, 5.0),
                ActivePeriod::new(10.0, 15.0),
                ActivePeriod::new(30.0, 35.0),
            ],
            0,
        )
        .unwrap();
        let joins: Vec<_> = c.joins_after(SimTime(0.0), None).collect();
        assert_eq!(joins, vec![SimTime(10.0), SimTime(30.0)]);

        let bounded: Vec<_> = c.joins_after(SimTime(0.0), Some(SimTime(20.0))).collect();
        assert_eq!(bounded, vec![SimTime(10.0)]);
    }
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicle {
    use super::*;

    #[test]
    fn fifo_queue_waits_for_previous_task() {
        let mut v = Vehicle::new(VehicleId(0), Connectivity::all_day(), SimTime::ZERO);
        let first = v.enqueue(SimTime(1.0), 500.0);
        assert!((first.secs() - 1.5).abs() < 1e-9);
        // Second task is ready before the first finishes: it queues behind it.
        let second = v.enqueue(SimTime(1.2), 300.0);
        assert!((second.secs() - 1.8).abs() < 1e-9);
        assert!((v.work_ms - 800.0).abs() < 1e-9);
    }

    #[test]
    fn idle_queue_starts_at_ready() {
        let mut v = Vehicle::new(VehicleId(0), Connectivity::all_day(), SimTime::ZERO);
        v.enqueue(SimTime(1.0), 100.0);
        let later = v.enqueue(SimTime(5.0), 100.0);
        assert!((later.secs() - 5.1).abs() < 1e-9);
    }

    #[test]
    fn completions_are_monotonic() {
        let mut v = Vehicle::new(VehicleId(0), Connectivity::all_day(), SimTime(100.0));
        let mut last = SimTime::ZERO;
        for (ready, work) in [(100.0, 20.0), (100.01, 5.0), (101.0, 0.0), (101.0, 40.0)] {
            let done = v.enqueue(SimTime(ready), work);
            assert!(done >= last);
            last = done;
        }
    }

    #[test]
    fn fleet_assigns_ids_in_order() {
        let fleet = Vehicle::fleet(vec![Connectivity::all_day(); 3], SimTime(7.0));
        let ids: Vec<_> = fleet.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![VehicleId(0), VehicleId(1), VehicleId(2)]);
        assert!(fleet.iter().all(|v| v.queue_ready == SimTime(7.0)));
    }
}

// ── QueryState ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod query_state {
    use super::*;

    #[test]
    fn resolves_once_on_threshold() {
        let mut q = QueryState::new(QuerySpec::new(0, 2, 0.0));
        assert!(!q.record_answer(false, SimTime(1.0)));
        assert!(!q.record_answer(true, SimTime(2.0)));
        assert!(q.record_answer(true, SimTime(3.0)));
        assert!(!q.record_answer(true, SimTime(4.0)));
        assert_eq!(q.resolution, Some(SimTime(3.0)));
        assert_eq!(q.remaining, -1);
        assert_eq!(q.remaining_clamped(), 0);
        // 2 / (2 + 1 negative) at resolution time.
        assert!((q.estimate.unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn finalize_marks_unresolved_infinite() {
        let mut q = QueryState::new(QuerySpec::new(0, 5, 0.0));
        q.record_answer(true, SimTime(1.0));
        q.record_answer(false, SimTime(1.0));
        q.record_answer(false, SimTime(1.0));
        q.finalize();
        assert_eq!(q.resolution, Some(SimTime::INFINITY));
        assert!(!q.is_resolved());
        assert!((q.estimate.unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut q = QueryState::new(QuerySpec::new(0, 5, 0.0));
        q.record_answer(true, SimTime(1.0));
        q.finalize();
        let (res, est) = (q.resolution, q.estimate);
        q.finalize();
        assert_eq!(q.resolution, res);
        assert_eq!(q.estimate, est);
    }

    #[test]
    fn finalize_without_answers_leaves_estimate_empty() {
        let mut q = QueryState::new(QuerySpec::new(0, 1, 0.0));
        q.finalize();
        assert_eq!(q.estimate, None);
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;
    use crate::{
        QueryOracle, check_alignment, load_active_periods_reader, load_answer_matrix_reader,
        load_fleet_readers, load_time_matrix_reader,
    };

    const TIMES: &str = "\
a.txt,10.0,20.5,\n\
b.txt,11.0,21.5,\n\
";

    const ANSWERS: &str = "\
a.txt,1,0,\n\
b.txt,0,1,\n\
";

    const PERIODS: &str = "\
a.txt,0,100,200,300,\n\
b.txt,50,60,\n\
";

    #[test]
    fn time_matrix_drops_id_and_trailing_field() {
        let m = load_time_matrix_reader(Cursor::new(TIMES)).unwrap();
        assert_eq!(m.ids, vec!["a.txt", "b.txt"]);
        assert_eq!(m.rows, vec![vec![10.0, 20.5], vec![11.0, 21.5]]);
    }

    #[test]
    fn answer_matrix_parses_bits() {
        let m = load_answer_matrix_reader(Cursor::new(ANSWERS)).unwrap();
        assert_eq!(m.rows, vec![vec![true, false], vec![false, true]]);
    }

    #[test]
    fn answer_matrix_rejects_non_bits() {
        let err = load_answer_matrix_reader(Cursor::new("a.txt,2,\n")).unwrap_err();
        assert!(matches!(err, FleetError::Parse { line: 1, .. }));
    }

    #[test]
    fn active_periods_pair_up() {
        let p = load_active_periods_reader(Cursor::new(PERIODS)).unwrap();
        assert_eq!(p.rows[0].len(), 2);
        assert_eq!(p.rows[1].periods(), &[ActivePeriod::new(50.0, 60.0)]);
    }

    #[test]
    fn active_periods_reject_odd_bounds() {
        let err = load_active_periods_reader(Cursor::new("a.txt,0,100,200,\n")).unwrap_err();
        assert!(matches!(err, FleetError::Parse { .. }));
    }

    #[test]
    fn alignment_detects_count_mismatch() {
        let a = vec!["x".to_owned(), "y".to_owned()];
        let b = vec!["x".to_owned()];
        let err = check_alignment(&[("a", a.as_slice()), ("b", b.as_slice())]).unwrap_err();
        assert!(matches!(err, FleetError::RowCountMismatch { .. }));
    }

    #[test]
    fn alignment_detects_identifier_mismatch() {
        let a = vec!["x".to_owned(), "y".to_owned()];
        let b = vec!["x".to_owned(), "z".to_owned()];
        let err = check_alignment(&[("a", a.as_slice()), ("b", b.as_slice())]).unwrap_err();
        assert!(matches!(err, FleetError::Misaligned { line: 2, .. }));
    }

    #[test]
    fn fleet_static_model_uses_all_day_windows() {
        let fleet =
            load_fleet_readers(Cursor::new(TIMES), Cursor::new(ANSWERS), None::<Cursor<&str>>)
                .unwrap();
        assert_eq!(fleet.vehicle_count(), 2);
        assert!(fleet.connectivity.iter().all(|c| *c == Connectivity::all_day()));
        assert_eq!(fleet.oracle.column_count(), 2);
        assert_eq!(fleet.oracle.work_ms(1, VehicleId(1)), 21.5);
        assert!(fleet.oracle.answer(0, VehicleId(0)));
    }

    #[test]
    fn fleet_dynamic_model_is_cross_checked() {
        let misordered = "b.txt,50,60,\na.txt,0,100,\n";
        let err = load_fleet_readers(
            Cursor::new(TIMES),
            Cursor::new(ANSWERS),
            Some(Cursor::new(misordered)),
        )
        .unwrap_err();
        assert!(matches!(err, FleetError::Misaligned { line: 1, .. }));
    }
}

// ── MatrixOracle ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod oracle {
    use super::*;
    use crate::{MatrixOracle, QueryOracle};

    #[test]
    fn scale_time_multiplies_work() {
        let o = MatrixOracle::uniform(2, 3, 10.0, true).with_scale_time(1000.0);
        assert_eq!(o.work_ms(2, VehicleId(1)), 10_000.0);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = MatrixOracle::new(vec![vec![1.0, 2.0], vec![1.0]], vec![vec![true, false]; 2])
            .unwrap_err();
        assert!(matches!(err, FleetError::Parse { line: 2, .. }));
    }

    #[test]
    fn positive_rate_counts_rows() {
        let o = MatrixOracle::new(
            vec![vec![0.0]; 4],
            vec![vec![true], vec![false], vec![true], vec![true]],
        )
        .unwrap();
        assert!((o.positive_rate(0) - 0.75).abs() < 1e-12);
    }
}
