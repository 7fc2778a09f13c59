//! The `OutputWriter` trait implemented by all backend writers.

use crate::{EstimateErrorRow, EventRow, FairnessRow, OutputResult, TrialRow, VehicleWorkRow};

/// Sink for everything the driver and the trace observer record.
///
/// Inside a simulation run errors are stored by the observer and retrieved
/// with [`TraceObserver::take_error`](crate::TraceObserver::take_error).
pub trait OutputWriter {
    /// One trial line: per-query resolution times, then total work.
    fn write_trial(&mut self, row: &TrialRow) -> OutputResult<()>;

    /// The averaged line closing a batch of trials.
    fn write_summary(&mut self, row: &TrialRow) -> OutputResult<()>;

    /// Per-vehicle work table; `policies` names the value columns.
    fn write_vehicle_work(&mut self, policies: &[&str], rows: &[VehicleWorkRow]) -> OutputResult<()>;

    fn write_estimate_error(&mut self, row: &EstimateErrorRow) -> OutputResult<()>;

    /// `policies` names the value columns; used for the header on first write.
    fn write_fairness(&mut self, policies: &[&str], row: &FairnessRow) -> OutputResult<()>;

    fn write_event(&mut self, row: &EventRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
