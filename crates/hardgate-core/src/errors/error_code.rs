//! Stable error codes surfaced to hosts alongside error messages.

pub const ACQUISITION_ERROR: &str = "ACQUISITION_ERROR";
pub const DETECTION_ERROR: &str = "DETECTION_ERROR";
pub const GATE_EVALUATION_ERROR: &str = "GATE_EVALUATION_ERROR";
pub const EVIDENCE_SOURCE_ERROR: &str = "EVIDENCE_SOURCE_ERROR";
pub const NO_APPLICABLE_GATES: &str = "NO_APPLICABLE_GATES";
pub const REGISTRY_ERROR: &str = "REGISTRY_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CANCELLED: &str = "CANCELLED";

/// Maps an error to its stable, machine-readable code.
pub trait HardgateErrorCode {
    fn error_code(&self) -> &'static str;
}
