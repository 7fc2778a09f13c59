//! The `Vehicle` model: connectivity plus a single-slot FIFO processing queue.

use tq_core::{SimTime, VehicleId};

use crate::Connectivity;

/// One simulated mobile agent.
///
/// Topology (`connectivity`) is fixed for the run; `queue_ready` and
/// `work_ms` are running counters updated by the engine on every delivered
/// contact.
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id: VehicleId,

    pub connectivity: Connectivity,

    /// Instant at which the local processing queue next frees up.  The
    /// vehicle runs one task at a time, first come first served.
    pub queue_ready: SimTime,

    /// Cumulative on-board work, in ms.  Counted for every delivered
    /// contact, including ones whose answer is later lost to a disconnect.
    pub work_ms: f64,
}

impl Vehicle {
    pub fn new(id: VehicleId, connectivity: Connectivity, start: SimTime) -> Self {
        Self { id, connectivity, queue_ready: start, work_ms: 0.0 }
    }

    /// Build a fleet with ids assigned in input order.
    pub fn fleet(connectivity: Vec<Connectivity>, start: SimTime) -> Vec<Vehicle> {
        connectivity
            .into_iter()
            .enumerate()
            .map(|(i, c)| Vehicle::new(VehicleId(i as u32), c, start))
            .collect()
    }

    #[inline]
    pub fn is_active(&self, t: SimTime) -> bool {
        self.connectivity.is_active(t)
    }

    /// Queue a task of `work_ms` that becomes available at `ready`.
    ///
    /// Returns the completion instant.  Completions are non-decreasing
    /// across successive calls.
    pub fn enqueue(&mut self, ready: SimTime, work_ms: f64) -> SimTime {
        self.work_ms += work_ms;
        self.queue_ready = self.queue_ready.max(ready).after_millis(work_ms);
        self.queue_ready
    }
}
