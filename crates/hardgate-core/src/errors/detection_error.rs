//! Technology detection errors.

use super::error_code::{self, HardgateErrorCode};

/// Detection never partially fails: either a full profile is produced or one of these.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DetectionError {
    #[error("File inventory is empty")]
    EmptyInventory,

    #[error("No readable (non-binary) files among {total} inventory entries")]
    NoReadableFiles { total: usize },
}

impl HardgateErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::DETECTION_ERROR
    }
}
