//! `tq-policy` — the contact-scheduling policy trait and its built-in
//! implementations.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`model`]    | `ContactPolicy` trait, `Observation`                           |
//! | [`pool`]     | `CandidatePool`, `ContactLedger`, `QueryPools`, `PriorityPool` |
//! | [`adaptive`] | `AdaptiveParams`, `AdaptiveStats`, `batch_size`                |
//! | [`eager`]    | `EagerPolicy` — whole pool at once                             |
//! | [`lazy`]     | `LazyPolicy` — one replacement per failed contact              |
//! | [`relay`]    | `RelayPolicy` — one more contact after every event             |
//! | [`balanced`] | `BalancedPolicy` — adaptive batch size, random picks           |
//! | [`fair`]     | `FairPolicy` — adaptive batch size, least-loaded picks         |
//! | [`kind`]     | `PolicyKind` — config-level selector and factory               |
//! | [`error`]    | `PolicyError`, `PolicyResult<T>`                               |
//!
//! # Design notes
//!
//! Policies never see the engine.  Each owns its pools and counters and is
//! driven through `ContactPolicy` calls; all randomness arrives through the
//! `SimRng` handed to `init_pools` and `new_active_vehicle`.  The adaptive
//! policies share the batch-size helper in [`adaptive`] rather than
//! inheriting from one another.

pub mod adaptive;
pub mod balanced;
pub mod eager;
pub mod error;
pub mod fair;
pub mod kind;
pub mod lazy;
pub mod model;
pub mod pool;
pub mod relay;

#[cfg(test)]
mod tests;

pub use adaptive::{AdaptiveParams, AdaptiveStats, batch_size};
pub use balanced::BalancedPolicy;
pub use eager::EagerPolicy;
pub use error::{PolicyError, PolicyResult};
pub use fair::{FairPolicy, VehicleLoad};
pub use kind::PolicyKind;
pub use lazy::LazyPolicy;
pub use model::{ContactPolicy, Observation};
pub use pool::{CandidatePool, ContactLedger, LoadKey, PriorityPool, QueryPools, VehicleSet};
pub use relay::RelayPolicy;
