use thiserror::Error;
use tq_core::TqError;
use tq_fleet::FleetError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match vehicle count {expected}")]
    VehicleCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("simulation already ran; build a new one for another trial")]
    AlreadyRan,

    #[error(transparent)]
    Core(#[from] TqError),

    #[error(transparent)]
    Fleet(#[from] FleetError),
}

pub type SimResult<T> = Result<T, SimError>;
