//! `tq-sim` — discrete-event engine for the threshold-query simulator.
//!
//! # Contact execution
//!
//! ```text
//! contact(t, q, v):
//!   lat    = latency.sample_ms()            one-way, used both ways
//!   ready  = t + lat + payload(q)
//!   timer  = t + timer_duration
//!   v disconnected at ready           → TimerFired at timer
//!   done   = max(queue_ready, ready) + work(q, v)
//!   done past v's window end          → TimerFired at timer   (aborted)
//!   answer = done + lat
//!   answer > timer                    → TimerFired + LateAnswer
//!   otherwise                         → OnTimeAnswer
//! ```
//!
//! Events are never cancelled.  Ties at equal time are broken by query
//! (joining first), then vehicle, then kind:
//! `VehicleJoining < TimerFired < LateAnswer < OnTimeAnswer`.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tq_core::{FixedLatency, SimConfig};
//! use tq_fleet::{Connectivity, MatrixOracle, QuerySpec};
//! use tq_policy::EagerPolicy;
//! use tq_sim::{NoopObserver, SimBuilder};
//!
//! let oracle = MatrixOracle::uniform(1, 1, 20.0, true);
//! let mut sim = SimBuilder::new(
//!     SimConfig::default(),
//!     vec![Connectivity::all_day()],
//!     vec![QuerySpec::new(0, 1, 0.0)],
//!     EagerPolicy::new(),
//!     oracle,
//! )
//! .latency(FixedLatency(50.0))
//! .build()?;
//! let outcome = sim.run(&mut NoopObserver)?;
//! assert_eq!(outcome.resolution_ms, vec![120.0]);
//! ```

pub mod builder;
pub mod error;
pub mod event;
pub mod observer;
pub mod outcome;
pub mod sim;


pub use builder::{DEFAULT_LATENCY_MS, SimBuilder};
pub use error::{SimError, SimResult};
pub use event::{ContactFate, Event, EventQueue};
pub use observer::{NoopObserver, SimObserver};
pub use outcome::{QueryReport, SimOutcome, round_to};
pub use sim::Sim;
