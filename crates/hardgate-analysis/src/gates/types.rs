//! Gate definitions and per-gate results.

use std::fmt;

use hardgate_core::config::ScoringConfig;
use hardgate_core::errors::GateEvaluationError;
use serde::{Deserialize, Serialize};

use super::predicate::Predicate;
use crate::evidence::EvidenceItem;

/// Stable gate identifier, e.g. `STRUCTURED_LOGS`.
pub type GateId = String;

/// Severity of a gate, used for recommendation ranking. Ordered low → critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCategory {
    Logging,
    Security,
    Reliability,
    Monitoring,
    Testing,
    Scalability,
}

/// Whether a match supports or contradicts compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

/// How a pattern body is matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// ASCII case-insensitive substring.
    Literal(String),
    /// Case-insensitive regular expression.
    Regex(String),
    /// A line matching `anchor` with a `context` match within `lines` lines of it.
    Window {
        anchor: String,
        context: String,
        #[serde(default)]
        lines: u32,
    },
}

/// What a pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternTarget {
    /// Each line of the file body.
    #[default]
    Content,
    /// The file path; a hit is reported at line 0.
    Path,
}

/// One detection pattern of a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub matcher: PatternKind,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default)]
    pub target: PatternTarget,
    /// Per-hit score; falls back to the configured hit weight.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// Scoring strategy of a gate, resolved from its name when the registry loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    /// Starts at 0; positive hits saturate toward 100, negative hits subtract.
    Saturating,
    /// Starts at 100; only negative hits move the score. For anti-pattern gates.
    Inverse,
}

impl EvaluatorKind {
    const TABLE: &'static [(&'static str, EvaluatorKind)] = &[
        ("saturating", EvaluatorKind::Saturating),
        ("inverse", EvaluatorKind::Inverse),
    ];

    /// Resolve an evaluator by its registry name.
    pub fn resolve(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn baseline(&self) -> f64 {
        match self {
            Self::Saturating => 0.0,
            Self::Inverse => 100.0,
        }
    }
}

/// Remediation guidance attached to a gate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Remediation {
    /// Actions when no positive evidence exists at all.
    pub absent: Vec<String>,
    /// Actions when the control exists but is incomplete.
    pub improve: Vec<String>,
}

/// A hard gate. Read-only for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDefinition {
    pub id: GateId,
    pub name: String,
    pub category: GateCategory,
    pub applicability: Predicate,
    pub patterns: Vec<Pattern>,
    pub weight: f64,
    pub severity: Severity,
    pub evaluator: EvaluatorKind,
    pub remediation: Remediation,
}

/// Gate outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Pass,
    Partial,
    Fail,
    NotApplicable,
    Error,
}

impl GateStatus {
    /// Status of an applicable, successfully evaluated gate.
    pub fn from_score(score: f64, thresholds: &StatusThresholds) -> Self {
        if score >= thresholds.pass {
            Self::Pass
        } else if score >= thresholds.partial {
            Self::Partial
        } else {
            Self::Fail
        }
    }

    /// PASS, PARTIAL, and FAIL gates are scored; the rest are excluded.
    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Pass | Self::Partial | Self::Fail)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Partial => "PARTIAL",
            Self::Fail => "FAIL",
            Self::NotApplicable => "NOT_APPLICABLE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Score boundaries for PASS and PARTIAL (inclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusThresholds {
    pub pass: f64,
    pub partial: f64,
}

impl StatusThresholds {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            pass: config.effective_pass_threshold(),
            partial: config.effective_partial_threshold(),
        }
    }
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

/// Result of one gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub id: GateId,
    pub name: String,
    pub category: GateCategory,
    pub status: GateStatus,
    pub score: f64,
    pub confidence: f64,
    pub weight: f64,
    pub severity: Severity,
    /// Pattern evidence first, then external evidence in source order.
    pub evidence: Vec<EvidenceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Degraded sources that cover this gate, in source registration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_sources: Vec<String>,
}

impl GateResult {
    /// A gate whose applicability predicate was not satisfied.
    pub fn not_applicable(def: &GateDefinition) -> Self {
        Self::base(def, GateStatus::NotApplicable, 0.0, 1.0)
    }

    /// A gate whose evaluation failed locally.
    pub fn errored(def: &GateDefinition, error: &GateEvaluationError) -> Self {
        let mut result = Self::base(def, GateStatus::Error, 0.0, 0.0);
        result.error = Some(error.to_string());
        result
    }

    /// An evaluated gate. Status follows from the score.
    pub fn scored(
        def: &GateDefinition,
        score: f64,
        evidence: Vec<EvidenceItem>,
        thresholds: &StatusThresholds,
    ) -> Self {
        let mut result = Self::base(def, GateStatus::from_score(score, thresholds), score, 1.0);
        result.evidence = evidence;
        result
    }

    fn base(def: &GateDefinition, status: GateStatus, score: f64, confidence: f64) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            category: def.category,
            status,
            score,
            confidence,
            weight: def.weight,
            severity: def.severity,
            evidence: Vec::new(),
            error: None,
            degraded_sources: Vec::new(),
        }
    }
}
