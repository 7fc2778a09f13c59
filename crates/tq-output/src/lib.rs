//! `tq-output` — result writers for the threshold-query simulator.
//!
//! The CSV backend implements [`OutputWriter`]; the driver writes trial,
//! workload, estimation-error and fairness tables through it, and
//! [`TraceObserver`] streams the dispatched events of a run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tq_output::{CsvWriter, TraceObserver};
//!
//! let writer = CsvWriter::with_prefix(Path::new("./output"), "fair_")?;
//! let mut obs = TraceObserver::new(writer);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use self::csv::{CsvWriter, fmt_value};
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::{EstimateErrorRow, EventRow, FairnessRow, TrialRow, VehicleWorkRow};
pub use writer::OutputWriter;
