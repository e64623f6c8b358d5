//! Error handling for Hardgate.
//! One error enum per subsystem, `thiserror` only.

pub mod acquisition_error;
pub mod config_error;
pub mod detection_error;
pub mod engine_error;
pub mod error_code;
pub mod evidence_error;
pub mod gate_error;
pub mod registry_error;
pub mod scoring_error;

pub use acquisition_error::AcquisitionError;
pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use engine_error::EngineError;
pub use error_code::HardgateErrorCode;
pub use evidence_error::EvidenceSourceError;
pub use gate_error::GateEvaluationError;
pub use registry_error::RegistryError;
pub use scoring_error::ScoringError;
