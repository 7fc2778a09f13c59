//! `TraceObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use tq_core::SimTime;
use tq_sim::{Event, SimObserver};

use crate::row::EventRow;
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes every dispatched event to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TraceObserver<W: OutputWriter> {
    writer:     W,
    written:    u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Events successfully written.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for TraceObserver<W> {
    fn on_event(&mut self, event: &Event) {
        let result = self.writer.write_event(&EventRow::from(event));
        if result.is_ok() {
            self.written += 1;
        }
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _end: SimTime) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
