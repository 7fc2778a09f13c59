//! CSV output backend.
//!
//! Files are created in the output directory on first write, each name
//! prefixed with the writer's `prefix`:
//!
//! | File            | Header                        | Line                          |
//! |-----------------|-------------------------------|-------------------------------|
//! | `trials.csv`    | none                          | `r_0,…,r_{k-1},total`         |
//! | `summary.csv`   | none                          | mean of the trial lines       |
//! | `works.csv`     | `vehicle,<policy>…`           | per-vehicle work              |
//! | `error.csv`     | `policy,n,q_0…`               | absolute estimation errors    |
//! | `fairness.csv`  | `trial,<policy>…`             | stdev of per-vehicle work     |
//! | `events.csv`    | `time_s,kind,query,vehicle`   | one dispatched event          |
//!
//! Unresolved queries are written as `inf`.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EstimateErrorRow, EventRow, FairnessRow, OutputError, OutputResult, TrialRow, VehicleWorkRow};

/// Format a float the way the downstream scripts read it: always with a
/// fractional part, `inf` for infinity.
pub fn fmt_value(x: f64) -> String {
    if x.is_infinite() {
        if x > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        format!("{x:?}")
    }
}

fn trial_record(row: &TrialRow) -> Vec<String> {
    row.resolution_ms
        .iter()
        .chain(std::iter::once(&row.total_work_ms))
        .map(|&x| fmt_value(x))
        .collect()
}

/// Writes simulation output to CSV files in one directory.
pub struct CsvWriter {
    dir:      PathBuf,
    prefix:   String,
    trials:   Option<Writer<File>>,
    summary:  Option<Writer<File>>,
    works:    Option<Writer<File>>,
    errors:   Option<Writer<File>>,
    fairness: Option<Writer<File>>,
    events:   Option<Writer<File>>,
    finished: bool,
}

impl CsvWriter {
    /// Writer for `dir`.  The directory is created if missing; files are
    /// created on first write.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Self::with_prefix(dir, "")
    }

    /// Like [`new`](Self::new) with every file name prefixed by `prefix`,
    /// e.g. `"balanced_"` → `balanced_trials.csv`.
    pub fn with_prefix(dir: &Path, prefix: &str) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir:      dir.to_path_buf(),
            prefix:   prefix.to_owned(),
            trials:   None,
            summary:  None,
            works:    None,
            errors:   None,
            fairness: None,
            events:   None,
            finished: false,
        })
    }

    /// Path of `name` within the output directory, prefix applied.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{name}", self.prefix))
    }
}

/// Open `path` into `slot` unless already open; write `header` on open.
fn ensure<'a>(
    slot:   &'a mut Option<Writer<File>>,
    path:   PathBuf,
    header: Option<Vec<String>>,
) -> OutputResult<&'a mut Writer<File>> {
    let writer = match slot.take() {
        Some(w) => w,
        None => {
            let mut w = Writer::from_path(path)?;
            if let Some(h) = header {
                w.write_record(&h)?;
            }
            w
        }
    };
    Ok(slot.insert(writer))
}

fn header(first: &str, rest: &[&str]) -> Vec<String> {
    std::iter::once(first).chain(rest.iter().copied()).map(str::to_owned).collect()
}

impl OutputWriter for CsvWriter {
    fn write_trial(&mut self, row: &TrialRow) -> OutputResult<()> {
        let path = self.path_of("trials.csv");
        ensure(&mut self.trials, path, None)?.write_record(trial_record(row))?;
        Ok(())
    }

    fn write_summary(&mut self, row: &TrialRow) -> OutputResult<()> {
        let path = self.path_of("summary.csv");
        ensure(&mut self.summary, path, None)?.write_record(trial_record(row))?;
        Ok(())
    }

    fn write_vehicle_work(&mut self, policies: &[&str], rows: &[VehicleWorkRow]) -> OutputResult<()> {
        if let Some(row) = rows.iter().find(|r| r.work_ms.len() != policies.len()) {
            return Err(OutputError::RowWidth { expected: policies.len(), got: row.work_ms.len() });
        }
        let path = self.path_of("works.csv");
        let w = ensure(&mut self.works, path, Some(header("vehicle", policies)))?;
        for row in rows {
            let mut record = vec![row.vehicle.to_string()];
            record.extend(row.work_ms.iter().map(|&x| fmt_value(x)));
            w.write_record(&record)?;
        }
        Ok(())
    }

    fn write_estimate_error(&mut self, row: &EstimateErrorRow) -> OutputResult<()> {
        let path = self.path_of("error.csv");
        let columns: Vec<String> = (0..row.errors.len()).map(|i| format!("q{i}")).collect();
        let mut head = vec!["policy".to_owned(), "n".to_owned()];
        head.extend(columns);
        let w = ensure(&mut self.errors, path, Some(head))?;
        let mut record = vec![row.policy.clone(), row.n.to_string()];
        record.extend(row.errors.iter().map(|&x| fmt_value(x)));
        w.write_record(&record)?;
        Ok(())
    }

    fn write_fairness(&mut self, policies: &[&str], row: &FairnessRow) -> OutputResult<()> {
        if row.stdev.len() != policies.len() {
            return Err(OutputError::RowWidth { expected: policies.len(), got: row.stdev.len() });
        }
        let path = self.path_of("fairness.csv");
        let w = ensure(&mut self.fairness, path, Some(header("trial", policies)))?;
        let mut record = vec![row.trial.to_string()];
        record.extend(row.stdev.iter().map(|&x| fmt_value(x)));
        w.write_record(&record)?;
        Ok(())
    }

    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        let path = self.path_of("events.csv");
        let head = header("time_s", &["kind", "query", "vehicle"]);
        ensure(&mut self.events, path, Some(head))?.write_record(&[
            fmt_value(row.time_secs),
            row.kind.as_str().to_owned(),
            row.query.map(|q| q.to_string()).unwrap_or_default(),
            row.vehicle.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        for w in [
            &mut self.trials,
            &mut self.summary,
            &mut self.works,
            &mut self.errors,
            &mut self.fairness,
            &mut self.events,
        ]
        .into_iter()
        .flatten()
        {
            w.flush()?;
        }
        Ok(())
    }
}
