//! JSON rendering of a compliance report.

use super::types::ComplianceReport;

/// Serialize `report`. Field order follows the struct layout, so equal
/// reports always render to identical bytes.
pub fn render(report: &ComplianceReport, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}

pub fn parse(text: &str) -> Result<ComplianceReport, serde_json::Error> {
    serde_json::from_str(text)
}
