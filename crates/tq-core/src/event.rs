//! Event kinds shared by the engine and the scheduling policies.

use std::fmt;

/// What happened at an event-queue entry.
///
/// The declaration order is the tie-break rank used by the engine when two
/// events share the same `(time, query, vehicle)`: joining first, then the
/// timer, then answers.  Policies see `LateAnswer` / `OnTimeAnswer` in
/// [`ContactPolicy::update`](../tq_policy/trait.ContactPolicy.html).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EventKind {
    /// A vehicle starts a new active period.
    VehicleJoining,
    /// The deadline of a contact expired before an on-time answer existed.
    TimerFired,
    /// An answer that arrives after its contact's timer already fired.
    LateAnswer,
    /// An answer that arrives before its contact's timer.
    OnTimeAnswer,
}

impl EventKind {
    /// `true` for the two answer kinds.
    #[inline]
    pub fn is_answer(self) -> bool {
        matches!(self, EventKind::LateAnswer | EventKind::OnTimeAnswer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::VehicleJoining => "vehicle_joining",
            EventKind::TimerFired     => "timer_fired",
            EventKind::LateAnswer     => "late_answer",
            EventKind::OnTimeAnswer   => "on_time_answer",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
