//! Run-level errors. A run either returns a complete report or exactly one of these.

use super::error_code::{self, HardgateErrorCode};
use super::{AcquisitionError, ConfigError, DetectionError, RegistryError, ScoringError};

/// Terminal failure of an evaluation run, identifying the fatal stage.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Detection failed: {0}")]
    Detection(#[from] DetectionError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Evaluation cancelled")]
    Cancelled,
}

impl EngineError {
    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Acquisition(_) => "acquisition",
            Self::Detection(_) => "detection",
            Self::Scoring(_) => "scoring",
            Self::Registry(_) => "registry",
            Self::Config(_) | Self::WorkerPool(_) => "setup",
            Self::Cancelled => "cancelled",
        }
    }
}

impl HardgateErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Acquisition(e) => e.error_code(),
            Self::Detection(e) => e.error_code(),
            Self::Scoring(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::WorkerPool(_) => error_code::CONFIG_ERROR,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
