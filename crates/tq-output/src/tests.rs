//! Integration tests for tq-output.

#[cfg(test)]
mod rows {
    use crate::{TrialRow, fmt_value};

    fn row(trial: u32, res: &[f64], total: f64) -> TrialRow {
        TrialRow { trial, resolution_ms: res.to_vec(), total_work_ms: total }
    }

    #[test]
    fn mean_is_column_wise() {
        let rows = [row(0, &[100.0, 200.0], 50.0), row(1, &[300.0, 400.0], 150.0)];
        let m = TrialRow::mean(&rows).unwrap();
        assert_eq!(m.resolution_ms, vec![200.0, 300.0]);
        assert_eq!(m.total_work_ms, 100.0);
        assert_eq!(m.trial, 2);
    }

    #[test]
    fn mean_rounds_to_hundredths() {
        let rows = [row(0, &[100.0], 10.0), row(1, &[100.0], 10.0), row(2, &[101.0], 11.0)];
        let m = TrialRow::mean(&rows).unwrap();
        assert_eq!(m.resolution_ms, vec![100.33]);
        assert_eq!(m.total_work_ms, 10.33);
    }

    #[test]
    fn unresolved_trial_makes_mean_infinite() {
        let rows = [row(0, &[100.0], 5.0), row(1, &[f64::INFINITY], 5.0)];
        assert_eq!(TrialRow::mean(&rows).unwrap().resolution_ms, vec![f64::INFINITY]);
        assert!(TrialRow::mean(&[]).is_none());
    }

    #[test]
    fn max_resolution() {
        assert_eq!(row(0, &[3.0, 9.0, 1.0], 0.0).max_resolution_ms(), 9.0);
    }

    #[test]
    fn values_keep_a_fraction() {
        assert_eq!(fmt_value(120.0), "120.0");
        assert_eq!(fmt_value(0.25), "0.25");
        assert_eq!(fmt_value(f64::INFINITY), "inf");
    }
}

#[cfg(test)]
mod csv_tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{EstimateErrorRow, FairnessRow, TrialRow, VehicleWorkRow};
    use crate::writer::OutputWriter;
    use crate::OutputError;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read(dir: &TempDir, name: &str) -> String {
        fs::read_to_string(dir.path().join(name)).unwrap()
    }

    #[test]
    fn files_created_on_first_write() {
        let dir = tmp();
        let mut w = CsvWriter::with_prefix(dir.path(), "eager_").unwrap();
        assert!(!dir.path().join("eager_trials.csv").exists());
        w.write_trial(&TrialRow { trial: 0, resolution_ms: vec![1.0], total_work_ms: 2.0 }).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("eager_trials.csv").exists());
        assert!(!dir.path().join("eager_summary.csv").exists());
    }

    #[test]
    fn trial_lines_have_no_header() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_trial(&TrialRow { trial: 0, resolution_ms: vec![120.0, f64::INFINITY], total_work_ms: 20.0 })
            .unwrap();
        w.write_trial(&TrialRow { trial: 1, resolution_ms: vec![130.5, 99.25], total_work_ms: 40.0 })
            .unwrap();
        w.write_summary(&TrialRow { trial: 2, resolution_ms: vec![125.25, f64::INFINITY], total_work_ms: 30.0 })
            .unwrap();
        w.finish().unwrap();

        assert_eq!(read(&dir, "trials.csv"), "120.0,inf,20.0\n130.5,99.25,40.0\n");
        assert_eq!(read(&dir, "summary.csv"), "125.25,inf,30.0\n");
    }

    #[test]
    fn vehicle_work_table() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = [
            VehicleWorkRow { vehicle: 0, work_ms: vec![10.0, 0.0] },
            VehicleWorkRow { vehicle: 1, work_ms: vec![5.5, 7.0] },
        ];
        w.write_vehicle_work(&["eager", "fair"], &rows).unwrap();
        w.finish().unwrap();

        let mut rdr = ::csv::Reader::from_path(dir.path().join("works.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["vehicle", "eager", "fair"]);
        let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][1], "5.5");
    }

    #[test]
    fn vehicle_work_width_checked() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = [VehicleWorkRow { vehicle: 0, work_ms: vec![1.0] }];
        let err = w.write_vehicle_work(&["eager", "fair"], &rows).unwrap_err();
        assert!(matches!(err, OutputError::RowWidth { expected: 2, got: 1 }));
        w.finish().unwrap();
        assert!(!dir.path().join("works.csv").exists());
    }

    #[test]
    fn vehicle_work_rejects_bad_row_after_good_ones() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = [
            VehicleWorkRow { vehicle: 0, work_ms: vec![1.0, 2.0] },
            VehicleWorkRow { vehicle: 1, work_ms: vec![3.0] },
        ];
        assert!(w.write_vehicle_work(&["eager", "fair"], &rows).is_err());
        w.finish().unwrap();
        assert!(!dir.path().join("works.csv").exists());
    }

    #[test]
    fn estimate_errors_and_fairness() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_estimate_error(&EstimateErrorRow { policy: "lazy".into(), n: 25, errors: vec![0.1, 0.02] })
            .unwrap();
        w.write_estimate_error(&EstimateErrorRow { policy: "fair".into(), n: 50, errors: vec![0.0, 0.5] })
            .unwrap();
        w.write_fairness(&["lazy", "fair"], &FairnessRow { trial: 0, stdev: vec![12.5, 3.0] }).unwrap();
        w.finish().unwrap();

        assert_eq!(read(&dir, "error.csv"), "policy,n,q0,q1\nlazy,25,0.1,0.02\nfair,50,0.0,0.5\n");
        assert_eq!(read(&dir, "fairness.csv"), "trial,lazy,fair\n0,12.5,3.0\n");
    }

    #[test]
    fn finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;
    use tq_core::{FixedLatency, SimConfig};
    use tq_fleet::{Connectivity, MatrixOracle, QuerySpec};
    use tq_policy::EagerPolicy;
    use tq_sim::SimBuilder;

    use crate::row::{EstimateErrorRow, EventRow, FairnessRow, TrialRow, VehicleWorkRow};
    use crate::writer::OutputWriter;
    use crate::{CsvWriter, OutputError, OutputResult, TraceObserver};

    fn late_answer_sim() -> tq_sim::Sim<EagerPolicy, MatrixOracle> {
        let config = SimConfig { timer_duration_ms: 100.0, ..SimConfig::default() };
        SimBuilder::new(
            config,
            vec![Connectivity::all_day()],
            vec![QuerySpec::new(0, 1, 0.0)],
            EagerPolicy::new(),
            MatrixOracle::uniform(1, 1, 20.0, true),
        )
        .latency(FixedLatency(50.0))
        .build()
        .unwrap()
    }

    #[test]
    fn trace_records_every_event() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = TraceObserver::new(writer);
        late_answer_sim().run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(obs.written(), 2);

        let mut rdr = ::csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "timer_fired");
        assert_eq!(&rows[1][1], "late_answer");
        assert_eq!(&rows[1][2], "0");
    }

    /// Fails every event write.
    struct Broken;

    impl OutputWriter for Broken {
        fn write_trial(&mut self, _: &TrialRow) -> OutputResult<()> { Ok(()) }
        fn write_summary(&mut self, _: &TrialRow) -> OutputResult<()> { Ok(()) }
        fn write_vehicle_work(&mut self, _: &[&str], _: &[VehicleWorkRow]) -> OutputResult<()> { Ok(()) }
        fn write_estimate_error(&mut self, _: &EstimateErrorRow) -> OutputResult<()> { Ok(()) }
        fn write_fairness(&mut self, _: &[&str], _: &FairnessRow) -> OutputResult<()> { Ok(()) }
        fn write_event(&mut self, _: &EventRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }
        fn finish(&mut self) -> OutputResult<()> { Ok(()) }
    }

    #[test]
    fn write_errors_are_kept_not_raised() {
        let mut obs = TraceObserver::new(Broken);
        let outcome = late_answer_sim().run(&mut obs).unwrap();
        assert_eq!(outcome.resolution_ms, vec![120.0]);
        assert_eq!(obs.written(), 0);
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
    }
}
