//! `tq-fleet` — vehicles, queries, and the files that describe them.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`period`]   | `ActivePeriod`, `Connectivity` (sorted disjoint windows)   |
//! | [`vehicle`]  | `Vehicle` (windows + FIFO processing queue)                |
//! | [`query`]    | `QuerySpec`, `QueryState` (threshold counters)             |
//! | [`oracle`]   | `QueryOracle` trait, `MatrixOracle`                        |
//! | [`loader`]   | Matrix / active-period loaders, `check_alignment`          |
//! | [`error`]    | `FleetError`, `FleetResult<T>`                             |
//!
//! # Processing model (summary)
//!
//! A contact that reaches vehicle `v` at `ready` while `v` is connected is
//! queued behind earlier work:
//!
//! ```text
//! completion = max(queue_ready, ready) + work
//! ```
//!
//! The answer is only sent if `completion` still falls inside the same
//! active period.

pub mod error;
pub mod loader;
pub mod oracle;
pub mod period;
pub mod query;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use error::{FleetError, FleetResult};
pub use loader::{
    FleetData, FleetPaths, LabeledRows, check_alignment, load_active_periods,
    load_active_periods_reader, load_answer_matrix, load_answer_matrix_reader, load_fleet,
    load_fleet_readers, load_time_matrix, load_time_matrix_reader,
};
pub use oracle::{MatrixOracle, QueryOracle};
pub use period::{ActivePeriod, Connectivity};
pub use query::{QuerySpec, QueryState};
pub use vehicle::Vehicle;
