//! Fleet input loaders.
//!
//! # File formats
//!
//! All files have one line per vehicle, no header, and share the same
//! vehicle ordering.  The first field is a vehicle identifier and the last
//! field is a trailing placeholder (lines are written with a trailing
//! comma); neither carries data.
//!
//! ```text
//! time-cost matrix     v017.txt,12.5,40.1,7.0,
//! answer matrix        v017.txt,1,0,0,
//! active periods       v017.txt,64800,65400,66000,70200,
//! ```
//!
//! Time costs are per-query processing samples in ms; answers are `0`/`1`;
//! active periods are alternating start/end timestamps in seconds.
//!
//! Sibling files are checked against each other with [`check_alignment`]
//! before any simulation runs: a row-count or identifier mismatch is a
//! hard failure.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::period::{ActivePeriod, Connectivity};
use crate::{FleetError, FleetResult, MatrixOracle};

// ── Row container ─────────────────────────────────────────────────────────────

/// Parsed rows paired with the vehicle identifier of each line.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledRows<T> {
    pub ids:  Vec<String>,
    pub rows: Vec<T>,
}

impl<T> LabeledRows<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the time-cost matrix (ms) from a file.
pub fn load_time_matrix(path: &Path) -> FleetResult<LabeledRows<Vec<f64>>> {
    let file = std::fs::File::open(path).map_err(FleetError::Io)?;
    load_time_matrix_reader(file)
}

/// Like [`load_time_matrix`] but accepts any `Read` source.
pub fn load_time_matrix_reader<R: Read>(reader: R) -> FleetResult<LabeledRows<Vec<f64>>> {
    parse_rows(reader, |fields, line| {
        fields.iter().map(|f| parse_f64(f, line)).collect()
    })
}

/// Load the 0/1 answer matrix from a file.
pub fn load_answer_matrix(path: &Path) -> FleetResult<LabeledRows<Vec<bool>>> {
    let file = std::fs::File::open(path).map_err(FleetError::Io)?;
    load_answer_matrix_reader(file)
}

/// Like [`load_answer_matrix`] but accepts any `Read` source.
pub fn load_answer_matrix_reader<R: Read>(reader: R) -> FleetResult<LabeledRows<Vec<bool>>> {
    parse_rows(reader, |fields, line| {
        fields.iter().map(|f| parse_answer(f, line)).collect()
    })
}

/// Load per-vehicle connectivity windows from an active-period file.
pub fn load_active_periods(path: &Path) -> FleetResult<LabeledRows<Connectivity>> {
    let file = std::fs::File::open(path).map_err(FleetError::Io)?;
    load_active_periods_reader(file)
}

/// Like [`load_active_periods`] but accepts any `Read` source.
pub fn load_active_periods_reader<R: Read>(reader: R) -> FleetResult<LabeledRows<Connectivity>> {
    parse_rows(reader, |fields, line| {
        if fields.len() % 2 != 0 {
            return Err(FleetError::Parse {
                line,
                msg: format!("odd number of period bounds ({})", fields.len()),
            });
        }
        let bounds = fields
            .iter()
            .map(|f| parse_f64(f, line))
            .collect::<FleetResult<Vec<f64>>>()?;
        let periods = bounds
            .chunks_exact(2)
            .map(|pair| ActivePeriod::new(pair[0], pair[1]))
            .collect();
        Connectivity::new(periods, line - 1)
    })
}

/// Verify that sibling files list the same vehicles in the same order.
///
/// `files` pairs a display name with the identifiers read from that file.
pub fn check_alignment(files: &[(&str, &[String])]) -> FleetResult<()> {
    let Some((_, first)) = files.first() else {
        return Ok(());
    };
    let names = || files.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ");

    if files.iter().any(|(_, ids)| ids.len() != first.len()) {
        return Err(FleetError::RowCountMismatch {
            files:  names(),
            counts: files.iter().map(|(_, ids)| ids.len()).collect(),
        });
    }
    for (i, id) in first.iter().enumerate() {
        if files.iter().any(|(_, ids)| &ids[i] != id) {
            return Err(FleetError::Misaligned { line: i + 1, files: names() });
        }
    }
    Ok(())
}

// ── Whole-fleet loading ───────────────────────────────────────────────────────

/// Paths of the input files for one run.
#[derive(Clone, Debug)]
pub struct FleetPaths {
    pub time_matrix:   PathBuf,
    pub answer_matrix: PathBuf,
    /// `None` selects the static model (one all-day window per vehicle).
    pub active_periods: Option<PathBuf>,
}

/// Everything the engine needs about the fleet, aligned by row.
#[derive(Clone, Debug)]
pub struct FleetData {
    pub ids:          Vec<String>,
    pub connectivity: Vec<Connectivity>,
    pub oracle:       MatrixOracle,
}

impl FleetData {
    pub fn vehicle_count(&self) -> usize {
        self.ids.len()
    }
}

/// Load and cross-check all input files of a run.
pub fn load_fleet(paths: &FleetPaths) -> FleetResult<FleetData> {
    let times = load_time_matrix(&paths.time_matrix)?;
    let answers = load_answer_matrix(&paths.answer_matrix)?;
    let periods = paths
        .active_periods
        .as_deref()
        .map(load_active_periods)
        .transpose()?;
    assemble(times, answers, periods)
}

/// Like [`load_fleet`] but accepts any `Read` sources.
pub fn load_fleet_readers<A: Read, B: Read, C: Read>(
    times:   A,
    answers: B,
    periods: Option<C>,
) -> FleetResult<FleetData> {
    let times = load_time_matrix_reader(times)?;
    let answers = load_answer_matrix_reader(answers)?;
    let periods = periods.map(load_active_periods_reader).transpose()?;
    assemble(times, answers, periods)
}

fn assemble(
    times:   LabeledRows<Vec<f64>>,
    answers: LabeledRows<Vec<bool>>,
    periods: Option<LabeledRows<Connectivity>>,
) -> FleetResult<FleetData> {
    let mut files: Vec<(&str, &[String])> =
        vec![("time-cost matrix", times.ids.as_slice()), ("answer matrix", answers.ids.as_slice())];
    if let Some(p) = &periods {
        files.push(("active periods", p.ids.as_slice()));
    }
    check_alignment(&files)?;

    let connectivity = match periods {
        Some(p) => p.rows,
        None => vec![Connectivity::all_day(); times.len()],
    };
    let oracle = MatrixOracle::new(times.rows, answers.rows)?;

    Ok(FleetData { ids: times.ids, connectivity, oracle })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Read every line, split off the identifier and the trailing field, and
/// hand the data fields to `parse` with the 1-based line number.
fn parse_rows<R, T, F>(reader: R, mut parse: F) -> FleetResult<LabeledRows<T>>
where
    R: Read,
    F: FnMut(&[&str], usize) -> FleetResult<T>,
{
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut ids = Vec::new();
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    let mut line = 0;

    while csv_reader.read_record(&mut record)? {
        line += 1;
        if record.len() < 2 {
            return Err(FleetError::Parse {
                line,
                msg: "expected an identifier and a trailing field".into(),
            });
        }
        let fields: Vec<&str> = record.iter().skip(1).take(record.len() - 2).collect();
        rows.push(parse(&fields, line)?);
        ids.push(record[0].to_owned());
    }

    Ok(LabeledRows { ids, rows })
}

fn parse_f64(s: &str, line: usize) -> FleetResult<f64> {
    s.parse::<f64>().map_err(|_| FleetError::Parse {
        line,
        msg: format!("invalid number {s:?}"),
    })
}

fn parse_answer(s: &str, line: usize) -> FleetResult<bool> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(FleetError::Parse {
            line,
            msg: format!("invalid answer {other:?}: expected 0 or 1"),
        }),
    }
}
