//! The compliance report and its sections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::{EvidenceKind, EvidenceSet};
use crate::gates::GateResult;
use crate::scoring::{ExecutiveSummary, Recommendation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub snapshot_fingerprint: String,
    pub registry_version: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Evidence counts across all gates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSummary {
    pub pattern_matches: usize,
    pub external: usize,
    /// Merged external items per source id.
    pub by_source: BTreeMap<String, usize>,
}

impl EvidenceSummary {
    /// Count merged evidence. Every registered source appears in `by_source`,
    /// even when none of its items were merged.
    pub fn from_results(results: &[GateResult], evidence: &EvidenceSet) -> Self {
        let mut summary = Self {
            by_source: evidence
                .sources()
                .iter()
                .map(|s| (s.source_id.clone(), 0))
                .collect(),
            ..Default::default()
        };
        for item in results.iter().flat_map(|r| &r.evidence) {
            match item.kind {
                EvidenceKind::PatternMatch => summary.pattern_matches += 1,
                EvidenceKind::External => {
                    summary.external += 1;
                    *summary.by_source.entry(item.source_id.clone()).or_insert(0) += 1;
                }
            }
        }
        summary
    }
}

/// Result of one evaluation run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub metadata: ReportMetadata,
    pub executive_summary: ExecutiveSummary,
    /// Every registry gate, in registry order.
    pub gates: Vec<GateResult>,
    pub recommendations: Vec<Recommendation>,
    pub degraded_sources: Vec<String>,
    pub evidence_summary: EvidenceSummary,
}

impl ComplianceReport {
    pub fn gate(&self, id: &str) -> Option<&GateResult> {
        self.gates.iter().find(|g| g.id == id)
    }
}
