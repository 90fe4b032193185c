use thiserror::Error;

pub type EstimationResult<T> = std::result::Result<T, EstimationError>;

/// Recoverable validation failures surfaced to the caller as form-level
/// messages. Nothing in this crate is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimationError {
    #[error("unknown hardware tier: {0}")]
    UnknownTier(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
