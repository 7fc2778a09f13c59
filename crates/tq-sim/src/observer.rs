//! Simulation observer trait for tracing and data collection.

use tq_core::{QueryId, SimTime, VehicleId};

use crate::{ContactFate, Event};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] as the run unfolds.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — count aborted contacts
///
/// ```rust,ignore
/// struct AbortCounter(usize);
///
/// impl SimObserver for AbortCounter {
///     fn on_contact(&mut self, _t: SimTime, _q: QueryId, _v: VehicleId, fate: &ContactFate) {
///         if matches!(fate, ContactFate::Aborted { .. }) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// A contact was executed at `time`.
    fn on_contact(&mut self, _time: SimTime, _query: QueryId, _vehicle: VehicleId, _fate: &ContactFate) {}

    /// An event was popped and is about to be dispatched.  Events past the
    /// horizon are not reported.
    fn on_event(&mut self, _event: &Event) {}

    /// `query` reached its threshold at `time`.
    fn on_resolved(&mut self, _query: QueryId, _time: SimTime) {}

    /// Called once after the loop ends, with the time of the last
    /// dispatched event.
    fn on_sim_end(&mut self, _end: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

impl<O: SimObserver + ?Sized> SimObserver for &mut O {
    fn on_contact(&mut self, time: SimTime, query: QueryId, vehicle: VehicleId, fate: &ContactFate) {
        (**self).on_contact(time, query, vehicle, fate)
    }

    fn on_event(&mut self, event: &Event) {
        (**self).on_event(event)
    }

    fn on_resolved(&mut self, query: QueryId, time: SimTime) {
        (**self).on_resolved(query, time)
    }

    fn on_sim_end(&mut self, end: SimTime) {
        (**self).on_sim_end(end)
    }
}
