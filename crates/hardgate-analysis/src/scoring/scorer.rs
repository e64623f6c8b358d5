//! Weighted overall score, risk band, and compliance rate.

use std::fmt;

use hardgate_core::config::ScoringConfig;
use hardgate_core::errors::ScoringError;
use serde::{Deserialize, Serialize};

use crate::evaluator::round2;
use crate::gates::{GateResult, GateStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Headline numbers of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    /// PASS gates over scored gates, in [0, 1].
    pub gate_compliance_rate: f64,
    pub total_gates: usize,
    pub passed: usize,
    pub partial: usize,
    pub failed: usize,
    pub not_applicable: usize,
    pub errored: usize,
}

pub struct ComplianceScorer {
    risk_low: f64,
    risk_medium: f64,
}

impl ComplianceScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            risk_low: config.effective_risk_low_threshold(),
            risk_medium: config.effective_risk_medium_threshold(),
        }
    }

    /// Band lower bounds are inclusive.
    pub fn risk_level(&self, score: f64) -> RiskLevel {
        if score >= self.risk_low {
            RiskLevel::Low
        } else if score >= self.risk_medium {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Only PASS, PARTIAL, and FAIL gates enter the weighted average.
    pub fn score(&self, results: &[GateResult]) -> Result<ExecutiveSummary, ScoringError> {
        let count = |status: GateStatus| results.iter().filter(|r| r.status == status).count();
        let (passed, partial, failed) = (
            count(GateStatus::Pass),
            count(GateStatus::Partial),
            count(GateStatus::Fail),
        );
        let not_applicable = count(GateStatus::NotApplicable);
        let errored = count(GateStatus::Error);

        let (numerator, denominator) = results
            .iter()
            .filter(|r| r.status.is_scored())
            .fold((0.0, 0.0), |(n, d), r| (n + r.score * r.weight, d + r.weight));
        if denominator <= 0.0 {
            return Err(ScoringError::NoApplicableGates {
                errored,
                not_applicable,
            });
        }

        let overall_score = round2(numerator / denominator);
        let scored = passed + partial + failed;
        Ok(ExecutiveSummary {
            overall_score,
            risk_level: self.risk_level(overall_score),
            gate_compliance_rate: (passed as f64 / scored as f64 * 10_000.0).round() / 10_000.0,
            total_gates: results.len(),
            passed,
            partial,
            failed,
            not_applicable,
            errored,
        })
    }
}
