//! Report model and renderers.

pub mod json;
pub mod types;

pub use types::{ComplianceReport, EvidenceSummary, ReportMetadata};
