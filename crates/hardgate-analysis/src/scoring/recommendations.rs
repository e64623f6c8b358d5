//! Ranked remediation guidance for failing, partial, and errored gates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::gates::{GateId, GateRegistry, GateResult, GateStatus, Severity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub gate_id: GateId,
    pub gate_name: String,
    pub severity: Severity,
    pub status: GateStatus,
    pub score: f64,
    pub text: String,
    pub actions: Vec<String>,
}

/// Builds recommendations, ordered by severity (high first), then by
/// remaining gap `100 - score` (large first), then by gate id.
pub struct RecommendationGenerator<'a> {
    registry: &'a GateRegistry,
}

impl<'a> RecommendationGenerator<'a> {
    pub fn new(registry: &'a GateRegistry) -> Self {
        Self { registry }
    }

    pub fn generate(&self, results: &[GateResult]) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = results
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    GateStatus::Fail | GateStatus::Partial | GateStatus::Error
                )
            })
            .map(|r| self.recommend(r))
            .collect();
        recommendations.sort_by(rank);
        recommendations
    }

    fn recommend(&self, result: &GateResult) -> Recommendation {
        let remediation = self.registry.get(&result.id).map(|g| &g.remediation);
        let (text, actions) = match result.status {
            GateStatus::Error => (
                format!(
                    "{} could not be evaluated: {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
                vec![
                    "Fix the gate definition so every pattern compiles".to_string(),
                    "Re-run the evaluation to obtain a score".to_string(),
                ],
            ),
            _ if result.score <= 0.0 => (
                format!("{} has no supporting evidence", result.name),
                remediation.map(|r| r.absent.clone()).unwrap_or_default(),
            ),
            _ => (
                format!(
                    "{} is {} at {:.2}; strengthen coverage",
                    result.name, result.status, result.score
                ),
                remediation.map(|r| r.improve.clone()).unwrap_or_default(),
            ),
        };
        Recommendation {
            gate_id: result.id.clone(),
            gate_name: result.name.clone(),
            severity: result.severity,
            status: result.status,
            score: result.score,
            text,
            actions,
        }
    }
}

fn rank(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| (100.0 - b.score).total_cmp(&(100.0 - a.score)))
        .then_with(|| a.gate_id.cmp(&b.gate_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::StatusThresholds;
    use hardgate_core::errors::GateEvaluationError;

    fn scored(registry: &GateRegistry, id: &str, score: f64) -> GateResult {
        GateResult::scored(
            registry.get(id).unwrap(),
            score,
            vec![],
            &StatusThresholds::default(),
        )
    }

    #[test]
    fn only_failing_partial_and_error_gates() {
        let registry = GateRegistry::builtin();
        let results = vec![
            scored(&registry, "RETRY_LOGIC", 100.0),
            scored(&registry, "TIMEOUT_IO", 50.0),
            GateResult::not_applicable(registry.get("AUTO_SCALE").unwrap()),
        ];
        let recs = RecommendationGenerator::new(&registry).generate(&results);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].gate_id, "TIMEOUT_IO");
        assert_eq!(recs[0].actions, registry.get("TIMEOUT_IO").unwrap().remediation.improve);
    }

    #[test]
    fn ranking_by_severity_gap_then_id() {
        let registry = GateRegistry::builtin();
        let results = vec![
            // medium
            scored(&registry, "THROTTLING", 0.0),
            // high, gap 60
            scored(&registry, "TIMEOUT_IO", 40.0),
            // high, gap 100
            scored(&registry, "RETRY_LOGIC", 0.0),
            // high, gap 100, id sorts before RETRY_LOGIC
            scored(&registry, "CIRCUIT_BREAKERS", 0.0),
            // critical
            scored(&registry, "AVOID_LOGGING_SECRETS", 50.0),
        ];
        let ids: Vec<String> = RecommendationGenerator::new(&registry)
            .generate(&results)
            .into_iter()
            .map(|r| r.gate_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "AVOID_LOGGING_SECRETS",
                "CIRCUIT_BREAKERS",
                "RETRY_LOGIC",
                "TIMEOUT_IO",
                "THROTTLING"
            ]
        );
    }

    #[test]
    fn zero_score_uses_absent_actions() {
        let registry = GateRegistry::builtin();
        let recs = RecommendationGenerator::new(&registry)
            .generate(&[scored(&registry, "STRUCTURED_LOGS", 0.0)]);
        assert_eq!(
            recs[0].actions[0],
            "Implement structured logging framework (log4j, winston, etc.)"
        );
    }

    #[test]
    fn error_gate_gets_fix_definition_advice() {
        let registry = GateRegistry::builtin();
        let err = GateEvaluationError::MalformedPattern {
            pattern_id: "p".into(),
            message: "unclosed group".into(),
        };
        let recs = RecommendationGenerator::new(&registry)
            .generate(&[GateResult::errored(registry.get("URL_MONITORING").unwrap(), &err)]);
        assert_eq!(recs[0].status, GateStatus::Error);
        assert!(recs[0].text.contains("unclosed group"));
        assert!(recs[0].actions[0].starts_with("Fix the gate definition"));
    }
}
