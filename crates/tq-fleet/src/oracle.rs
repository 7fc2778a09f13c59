//! Work and answer generators consulted by the engine.

use tq_core::VehicleId;

use crate::{FleetError, FleetResult};

/// Externally supplied ground truth: how long vehicle `v` needs to evaluate
/// a query column, and what it answers.
///
/// Implementations must be pure: the engine may ask for the same pair more
/// than once and expects the same result.
pub trait QueryOracle {
    /// Number of vehicles (rows) the oracle covers.
    fn vehicle_count(&self) -> usize;

    /// Number of query columns available.
    fn column_count(&self) -> usize;

    /// On-board processing time, in ms.
    fn work_ms(&self, column: usize, vehicle: VehicleId) -> f64;

    /// `true` if the vehicle satisfies the query condition.
    fn answer(&self, column: usize, vehicle: VehicleId) -> bool;
}

impl<T: QueryOracle + ?Sized> QueryOracle for &T {
    fn vehicle_count(&self) -> usize {
        (**self).vehicle_count()
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn work_ms(&self, column: usize, vehicle: VehicleId) -> f64 {
        (**self).work_ms(column, vehicle)
    }

    fn answer(&self, column: usize, vehicle: VehicleId) -> bool {
        (**self).answer(column, vehicle)
    }
}

// ── MatrixOracle ──────────────────────────────────────────────────────────────

/// Oracle backed by the time-cost and answer matrices, indexed
/// `[vehicle][column]`.
#[derive(Clone, Debug)]
pub struct MatrixOracle {
    times_ms:   Vec<Vec<f64>>,
    answers:    Vec<Vec<bool>>,
    columns:    usize,
    /// Multiplier applied to every work sample (slow-hardware scenarios).
    scale_time: f64,
}

impl MatrixOracle {
    /// Both matrices must have the same number of rows and every row the
    /// same width.
    pub fn new(times_ms: Vec<Vec<f64>>, answers: Vec<Vec<bool>>) -> FleetResult<Self> {
        if times_ms.len() != answers.len() {
            return Err(FleetError::RowCountMismatch {
                files:  "time-cost matrix, answer matrix".into(),
                counts: vec![times_ms.len(), answers.len()],
            });
        }
        let columns = times_ms.first().map_or(0, Vec::len);
        check_width(&times_ms, columns)?;
        check_width(&answers, columns)?;
        Ok(Self { times_ms, answers, columns, scale_time: 1.0 })
    }

    /// Every vehicle needs `work_ms` and answers `answer` for every column.
    pub fn uniform(vehicles: usize, columns: usize, work_ms: f64, answer: bool) -> Self {
        Self {
            times_ms:   vec![vec![work_ms; columns]; vehicles],
            answers:    vec![vec![answer; columns]; vehicles],
            columns,
            scale_time: 1.0,
        }
    }

    /// Multiply all work samples by `scale`.
    pub fn with_scale_time(mut self, scale: f64) -> Self {
        self.scale_time = scale;
        self
    }

    /// Fraction of vehicles answering positively for `column`.
    pub fn positive_rate(&self, column: usize) -> f64 {
        if self.answers.is_empty() {
            return 0.0;
        }
        let yes = self.answers.iter().filter(|row| row[column]).count();
        yes as f64 / self.answers.len() as f64
    }
}

impl QueryOracle for MatrixOracle {
    fn vehicle_count(&self) -> usize {
        self.times_ms.len()
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    #[inline]
    fn work_ms(&self, column: usize, vehicle: VehicleId) -> f64 {
        self.scale_time * self.times_ms[vehicle.index()][column]
    }

    #[inline]
    fn answer(&self, column: usize, vehicle: VehicleId) -> bool {
        self.answers[vehicle.index()][column]
    }
}

fn check_width<T>(rows: &[Vec<T>], columns: usize) -> FleetResult<()> {
    match rows.iter().position(|row| row.len() != columns) {
        None => Ok(()),
        Some(i) => Err(FleetError::Parse {
            line: i + 1,
            msg:  format!("row has {} query columns, expected {columns}", rows[i].len()),
        }),
    }
}
