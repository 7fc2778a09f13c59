//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `TqError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{QueryId, VehicleId};

/// The top-level error type for `tq-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TqError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("query {0} not found")]
    QueryNotFound(QueryId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("latency model error: {0}")]
    Latency(String),
}

/// Shorthand result type for `tq-core`.
pub type TqResult<T> = Result<T, TqError>;
