//! Gate registry load errors.

use super::error_code::{self, HardgateErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to parse registry {source_name}: {message}")]
    ParseError { source_name: String, message: String },

    #[error("Duplicate gate id: {0}")]
    DuplicateGate(String),

    #[error("Gate {gate_id}: {message}")]
    InvalidGate { gate_id: String, message: String },

    #[error("Unknown gate id: {0}")]
    UnknownGate(String),

    #[error("Gate {gate_id}: unknown evaluator {evaluator:?}")]
    UnknownEvaluator { gate_id: String, evaluator: String },
}

impl HardgateErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        error_code::REGISTRY_ERROR
    }
}
