//! `tq-core` — foundational types for the threshold-query fleet simulator.
//!
//! This crate is a dependency of every other `tq-*` crate.  It intentionally
//! has no `tq-*` dependencies and minimal external ones (`rand`,
//! `rand_distr`, and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `QueryId`                                |
//! | [`time`]        | `SimTime`, `SimConfig`                                |
//! | [`rng`]         | `SimRng` (seedable, per run / per trial)              |
//! | [`event`]       | `EventKind`                                           |
//! | [`latency`]     | `LatencyModel` and its fixed / gamma / empirical impls |
//! | [`error`]       | `TqError`, `TqResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and `SimConfig`.     |

pub mod error;
pub mod event;
pub mod ids;
pub mod latency;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TqError, TqResult};
pub use event::EventKind;
pub use ids::{QueryId, VehicleId};
pub use latency::{EmpiricalLatency, FixedLatency, FnLatency, GammaLatency, LatencyModel};
pub use rng::{SimRng, trial_seed};
pub use time::{SECS_PER_DAY, SimConfig, SimTime};
