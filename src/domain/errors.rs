// Domain-level errors for the lesion engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Stage name outside the eight known stages.
    #[error("invalid stage: {0}")]
    InvalidStage(String),

    /// Control parameter name outside the eight known parameters.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}
