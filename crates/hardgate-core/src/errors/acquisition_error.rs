//! Snapshot acquisition errors. Always fatal: the run aborts before detection.

use super::error_code::{self, HardgateErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Snapshot root not found: {path}")]
    RootNotFound { path: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Duplicate path in inventory: {path}")]
    DuplicatePath { path: String },

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl HardgateErrorCode for AcquisitionError {
    fn error_code(&self) -> &'static str {
        error_code::ACQUISITION_ERROR
    }
}
