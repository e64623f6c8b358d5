//! Parallel per-gate pattern evaluation.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use hardgate_core::config::{ScanDepth, ScoringConfig};
use hardgate_core::errors::{EngineError, GateEvaluationError};
use hardgate_core::traits::{Cancellable, CancellationToken};
use hardgate_core::types::Selection;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::matcher::CompiledPattern;
use super::saturating::{score_evidence, score_hits, RawHit, SaturationParams};
use crate::detection::TechnologyProfile;
use crate::evidence::{truncate_excerpt, EvidenceItem, EvidenceKind, PATTERN_SOURCE};
use crate::gates::{
    GateDefinition, GateRegistry, GateResult, PatternTarget, Polarity, StatusThresholds,
};
use crate::scanner::Snapshot;

/// Scans a snapshot for each gate's patterns and scores the matches.
///
/// Evaluation of one gate never touches another gate's state, so gates run
/// on the current rayon pool in any order. Results come back in registry order.
pub struct PatternEvaluator {
    hit_weight: f64,
    negative_penalty: f64,
    params: SaturationParams,
    thresholds: StatusThresholds,
    observed_at: DateTime<Utc>,
    depth: ScanDepth,
    selection: Selection,
}

impl PatternEvaluator {
    /// `observed_at` stamps every pattern evidence item.
    pub fn new(config: &ScoringConfig, observed_at: DateTime<Utc>) -> Self {
        Self {
            hit_weight: config.effective_hit_weight(),
            negative_penalty: config.effective_negative_penalty(),
            params: SaturationParams::from_config(config),
            thresholds: StatusThresholds::from_config(config),
            observed_at,
            depth: ScanDepth::default(),
            selection: Selection::All,
        }
    }

    /// Limit which files are read. Defaults to `ScanDepth::Comprehensive`.
    pub fn with_depth(mut self, depth: ScanDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Limit evaluation to `selection`. Gates outside it come back as
    /// NOT_APPLICABLE.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Evaluate every gate of `registry`. Non-applicable and unselected gates
    /// are returned as NOT_APPLICABLE without scanning. Cancellation is checked
    /// before each gate.
    pub fn evaluate_all(
        &self,
        registry: &GateRegistry,
        profile: &TechnologyProfile,
        snapshot: &Snapshot,
        cancel: &CancellationToken,
    ) -> Result<Vec<GateResult>, EngineError> {
        let results: Option<Vec<GateResult>> = registry
            .list_gates()
            .par_iter()
            .map(|gate| {
                if cancel.is_cancelled() {
                    return None;
                }
                if !self.selection.includes(&gate.id) {
                    debug!(gate_id = %gate.id, "gate not selected");
                    return Some(GateResult::not_applicable(gate));
                }
                if !gate.applicability.evaluate(profile) {
                    debug!(gate_id = %gate.id, "gate not applicable");
                    return Some(GateResult::not_applicable(gate));
                }
                Some(self.evaluate_gate(gate, snapshot))
            })
            .collect();
        match results {
            Some(results) if !cancel.is_cancelled() => Ok(results),
            _ => Err(EngineError::Cancelled),
        }
    }

    /// Evaluate one applicable gate. Local failures, panics included, become
    /// an ERROR result.
    pub fn evaluate_gate(&self, gate: &GateDefinition, snapshot: &Snapshot) -> GateResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_evaluate(gate, snapshot)))
            .unwrap_or_else(|payload| Err(GateEvaluationError::Panicked(panic_message(&payload))));
        match outcome {
            Ok(evidence) => {
                let score = score_evidence(gate.evaluator.baseline(), &evidence);
                let result = GateResult::scored(gate, score, evidence, &self.thresholds);
                debug!(
                    gate_id = %gate.id,
                    score = result.score,
                    status = %result.status,
                    hits = result.evidence.len(),
                    "gate evaluated"
                );
                result
            }
            Err(e) => {
                warn!(gate_id = %gate.id, error = %e, "gate evaluation failed");
                GateResult::errored(gate, &e)
            }
        }
    }

    fn try_evaluate(
        &self,
        gate: &GateDefinition,
        snapshot: &Snapshot,
    ) -> Result<Vec<EvidenceItem>, GateEvaluationError> {
        let patterns = gate
            .patterns
            .iter()
            .map(|p| {
                let default_weight = match p.polarity {
                    Polarity::Positive => self.hit_weight,
                    Polarity::Negative => self.negative_penalty,
                };
                CompiledPattern::compile(p, default_weight)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let needs_content = patterns.iter().any(|p| p.target == PatternTarget::Content);

        let mut hits = Vec::new();
        for file in snapshot.files().iter().filter(|f| f.within_depth(self.depth)) {
            let body = if needs_content {
                Some(
                    snapshot
                        .read(&file.path)
                        .map_err(|e| GateEvaluationError::UnreadableFile {
                            path: file.path.clone(),
                            message: e.to_string(),
                        })?,
                )
            } else {
                None
            };
            let lines: Vec<&str> = body.as_deref().map(|b| b.lines().collect()).unwrap_or_default();

            for (index, pattern) in patterns.iter().enumerate() {
                let raw = |line: usize, excerpt: &str| RawHit {
                    pattern: index,
                    polarity: pattern.polarity,
                    weight: pattern.weight,
                    path: file.path.clone(),
                    line,
                    excerpt: truncate_excerpt(excerpt),
                };
                match pattern.target {
                    PatternTarget::Path => {
                        if pattern.matches_path(&file.path) {
                            hits.push(raw(0, &file.path));
                        }
                    }
                    PatternTarget::Content => {
                        for line in pattern.matching_lines(&lines) {
                            hits.push(raw(line, lines[line - 1]));
                        }
                    }
                }
            }
        }

        Ok(score_hits(hits, &self.params)
            .into_iter()
            .map(|scored| EvidenceItem {
                source_id: PATTERN_SOURCE.to_string(),
                kind: EvidenceKind::PatternMatch,
                gate_id: gate.id.clone(),
                timestamp: self.observed_at,
                reliability: 1.0,
                polarity: scored.hit.polarity,
                reference: format!("{}:{}", scored.hit.path, scored.hit.line),
                excerpt: scored.hit.excerpt,
                pattern_id: Some(patterns[scored.hit.pattern].id.clone()),
                contribution: scored.contribution,
            })
            .collect())
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::TechnologyDetector;
    use crate::gates::{GateStatus, Pattern, PatternKind};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn evaluator() -> PatternEvaluator {
        PatternEvaluator::new(&ScoringConfig::default(), at())
    }

    fn gate_with(patterns: Vec<Pattern>) -> GateDefinition {
        let mut gate = GateRegistry::builtin()
            .get("RETRY_LOGIC")
            .cloned()
            .unwrap();
        gate.patterns = patterns;
        gate
    }

    fn regex(id: &str, body: &str) -> Pattern {
        Pattern {
            id: id.to_string(),
            matcher: PatternKind::Regex(body.to_string()),
            polarity: Polarity::Positive,
            target: PatternTarget::Content,
            weight: None,
            description: String::new(),
        }
    }

    #[test]
    fn evidence_references_and_excerpts() {
        let snap = Snapshot::from_sources([("svc/client.py", "x = 1\n    retry(3)   \n")]).unwrap();
        let result = evaluator().evaluate_gate(&gate_with(vec![regex("r", r"\bretry\b")]), &snap);
        assert_eq!(result.status, GateStatus::Fail);
        assert_eq!(result.score, 20.0);
        assert_eq!(result.evidence.len(), 1);
        let item = &result.evidence[0];
        assert_eq!(item.reference, "svc/client.py:2");
        assert_eq!(item.excerpt, "retry(3)");
        assert_eq!(item.pattern_id.as_deref(), Some("r"));
        assert_eq!(item.timestamp, at());
    }

    #[test]
    fn path_patterns_report_line_zero() {
        let snap = Snapshot::from_sources([("tests/test_api.py", "")]).unwrap();
        let mut p = regex("files", r"(^|/)tests/");
        p.target = PatternTarget::Path;
        let result = evaluator().evaluate_gate(&gate_with(vec![p]), &snap);
        assert_eq!(result.evidence[0].reference, "tests/test_api.py:0");
    }

    #[test]
    fn binary_files_are_not_scanned() {
        let snap = Snapshot::from_sources([("blob.bin", &b"retry\0retry"[..])]).unwrap();
        let result = evaluator().evaluate_gate(&gate_with(vec![regex("r", "retry")]), &snap);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn documentation_is_read_only_at_deep_depth() {
        let snap = Snapshot::from_sources([
            ("README.md", "Calls retry on failure"),
            ("notes.txt", "retry"),
            ("app.py", "print('hello')"),
        ])
        .unwrap();
        let gate = gate_with(vec![regex("r", "retry")]);

        let default = evaluator().evaluate_gate(&gate, &snap);
        assert!(default.evidence.is_empty());
        assert_eq!(default.score, 0.0);

        let deep = evaluator()
            .with_depth(ScanDepth::Deep)
            .evaluate_gate(&gate, &snap);
        let refs: Vec<&str> = deep.evidence.iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(refs, vec!["README.md:1", "notes.txt:1"]);
    }

    #[test]
    fn unselected_gates_are_not_applicable() {
        let snap = Snapshot::from_sources([("a.py", "client.retry(3)\nlogger.info('x')")]).unwrap();
        let registry = GateRegistry::builtin();
        let profile = TechnologyDetector::new().detect(snap.files()).unwrap();
        let results = evaluator()
            .with_selection(Selection::only(["RETRY_LOGIC"]))
            .evaluate_all(&registry, &profile, &snap, &CancellationToken::new())
            .unwrap();
        assert_eq!(results.len(), registry.len());
        for result in &results {
            if result.id == "RETRY_LOGIC" {
                assert_eq!(result.score, 20.0);
            } else {
                assert_eq!(result.status, GateStatus::NotApplicable, "{}", result.id);
                assert!(result.evidence.is_empty());
            }
        }
    }

    #[test]
    fn malformed_pattern_errors_the_gate() {
        let snap = Snapshot::from_sources([("a.py", "retry")]).unwrap();
        let result = evaluator().evaluate_gate(&gate_with(vec![regex("bad", "(retry")]), &snap);
        assert_eq!(result.status, GateStatus::Error);
        assert_eq!(result.confidence, 0.0);
        assert!(result.error.unwrap().contains("bad"));
    }

    #[test]
    fn cancelled_before_start() {
        let snap = Snapshot::from_sources([("a.py", "retry")]).unwrap();
        let registry = GateRegistry::builtin();
        let profile = TechnologyDetector::new().detect(snap.files()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = evaluator()
            .evaluate_all(&registry, &profile, &snap, &cancel)
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[test]
    fn results_follow_registry_order() {
        let snap = Snapshot::from_sources([("a.py", "logger.info('x')")]).unwrap();
        let registry = GateRegistry::builtin();
        let profile = TechnologyDetector::new().detect(snap.files()).unwrap();
        let results = evaluator()
            .evaluate_all(&registry, &profile, &snap, &CancellationToken::new())
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<&str> = registry.list_gates().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, expected);
    }
}
