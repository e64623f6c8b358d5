//! Evidence source errors. Local to one source; the source is reported as degraded.

use super::error_code::{self, HardgateErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvidenceSourceError {
    #[error("Source {source_id} unavailable: {message}")]
    Unavailable { source_id: String, message: String },

    #[error("Source {source_id} timed out after {timeout_ms}ms")]
    Timeout { source_id: String, timeout_ms: u64 },

    #[error("Invalid time range {0:?}")]
    InvalidTimeRange(String),
}

impl HardgateErrorCode for EvidenceSourceError {
    fn error_code(&self) -> &'static str {
        error_code::EVIDENCE_SOURCE_ERROR
    }
}
