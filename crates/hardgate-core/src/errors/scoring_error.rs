//! Scoring-stage errors.

use super::error_code::{self, HardgateErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    /// Every gate was either not applicable or errored, so the weighted
    /// denominator is zero.
    #[error(
        "No applicable, non-error gates to score ({errored} errored, {not_applicable} not applicable)"
    )]
    NoApplicableGates {
        errored: usize,
        not_applicable: usize,
    },
}

impl HardgateErrorCode for ScoringError {
    fn error_code(&self) -> &'static str {
        error_code::NO_APPLICABLE_GATES
    }
}
