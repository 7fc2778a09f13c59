use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("fleet parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("input files {files} have different row counts: {counts:?}")]
    RowCountMismatch { files: String, counts: Vec<usize> },

    #[error("vehicle identifier mismatch at line {line} in files {files}")]
    Misaligned { line: usize, files: String },

    #[error("invalid active periods for vehicle {vehicle}: {reason}")]
    InvalidPeriods { vehicle: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FleetResult<T> = Result<T, FleetError>;
