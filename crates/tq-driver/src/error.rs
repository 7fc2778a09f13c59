use thiserror::Error;
use tq_core::TqError;
use tq_fleet::FleetError;
use tq_output::OutputError;
use tq_policy::PolicyError;
use tq_sim::SimError;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("scenario error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] TqError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type DriverResult<T> = Result<T, DriverError>;
