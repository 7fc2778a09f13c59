//! Event-queue entries and the min-heap that orders them.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tq_core::{EventKind, QueryId, SimTime, VehicleId};

/// One scheduled occurrence.
///
/// Ordered by `(time, query, vehicle, kind)`.  `query` is `None` for
/// `VehicleJoining`, which therefore sorts before any query event at the
/// same instant.  `work_ms` rides along and takes no part in the ordering.
#[derive(Copy, Clone, Debug)]
pub struct Event {
    pub time:    SimTime,
    pub query:   Option<QueryId>,
    pub vehicle: VehicleId,
    pub kind:    EventKind,
    /// Work the contact cost on the vehicle, as computed when it was queued.
    pub work_ms: f64,
}

impl Event {
    pub fn joining(time: SimTime, vehicle: VehicleId) -> Self {
        Self { time, query: None, vehicle, kind: EventKind::VehicleJoining, work_ms: 0.0 }
    }

    pub fn contact(time: SimTime, query: QueryId, vehicle: VehicleId, kind: EventKind, work_ms: f64) -> Self {
        Self { time, query: Some(query), vehicle, kind, work_ms }
    }

    fn key(&self) -> (SimTime, Option<QueryId>, VehicleId, EventKind) {
        (self.time, self.query, self.vehicle, self.kind)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// What became of a single contact, decided when it is executed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ContactFate {
    /// The answer arrives before the timer.
    OnTime { answer_at: SimTime },
    /// The timer fires first; the answer still arrives at `answer_at`.
    Late { answer_at: SimTime },
    /// Delivered, but processing would finish after the vehicle disconnects
    /// at `window_end`.  Only the timer fires.
    Aborted { window_end: SimTime },
    /// The vehicle was disconnected when the query would have arrived.
    Unreachable,
}

impl ContactFate {
    /// `true` if the contact will produce an answer event.
    pub fn answers(&self) -> bool {
        matches!(self, ContactFate::OnTime { .. } | ContactFate::Late { .. })
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

/// Earliest-first event queue.  Events are never cancelled; they leave the
/// queue only through [`pop`](Self::pop).
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.heap.push(Reverse(event));
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(e)| e)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(e)| e)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
