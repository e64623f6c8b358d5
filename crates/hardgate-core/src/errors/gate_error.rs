//! Gate-local evaluation errors. These never abort a run; the gate is marked ERROR.

use super::error_code::{self, HardgateErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateEvaluationError {
    #[error("Malformed pattern {pattern_id}: {message}")]
    MalformedPattern { pattern_id: String, message: String },

    #[error("Unreadable file {path}: {message}")]
    UnreadableFile { path: String, message: String },

    #[error("Evaluator panicked: {0}")]
    Panicked(String),
}

impl HardgateErrorCode for GateEvaluationError {
    fn error_code(&self) -> &'static str {
        error_code::GATE_EVALUATION_ERROR
    }
}
