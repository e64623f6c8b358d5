//! Single-call evaluation entry point.

use chrono::{DateTime, Utc};
use hardgate_core::config::{HardgateConfig, ScanDepth};
use hardgate_core::errors::EngineError;
use hardgate_core::traits::{Cancellable, CancellationToken};
use hardgate_core::types::Selection;
use tracing::info;

use crate::detection::TechnologyDetector;
use crate::evaluator::PatternEvaluator;
use crate::evidence::{EvidenceAggregator, EvidenceSet};
use crate::gates::{GateRegistry, GateResult, StatusThresholds};
use crate::report::{ComplianceReport, EvidenceSummary, ReportMetadata};
use crate::scanner::Snapshot;
use crate::scoring::{ComplianceScorer, RecommendationGenerator};

/// Per-run inputs that are not data: configuration, the evaluation
/// timestamp, scan depth, gate selection, and the cancellation flag. The
/// engine never reads the clock.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub config: &'a HardgateConfig,
    pub evaluated_at: DateTime<Utc>,
    pub depth: ScanDepth,
    pub gates: Selection,
    pub cancel: CancellationToken,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a HardgateConfig, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            config,
            evaluated_at,
            depth: config.scan.effective_depth(),
            gates: Selection::All,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_depth(mut self, depth: ScanDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_gates(mut self, gates: Selection) -> Self {
        self.gates = gates;
        self
    }

    pub(crate) fn pattern_evaluator(&self) -> PatternEvaluator {
        PatternEvaluator::new(&self.config.scoring, self.evaluated_at)
            .with_depth(self.depth)
            .with_selection(self.gates.clone())
    }

    fn check_cancelled(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Evaluate `snapshot` against `registry` with already-collected `evidence`.
///
/// Gates run on the current rayon pool. For fixed inputs and context the
/// report is identical on every call.
pub fn evaluate(
    snapshot: &Snapshot,
    registry: &GateRegistry,
    evidence: &EvidenceSet,
    ctx: &RunContext<'_>,
) -> Result<ComplianceReport, EngineError> {
    ctx.check_cancelled()?;
    registry.check_selection(&ctx.gates)?;
    let profile = TechnologyDetector::new().detect(snapshot.files())?;
    let results = ctx
        .pattern_evaluator()
        .evaluate_all(registry, &profile, snapshot, &ctx.cancel)?;
    assemble(snapshot.fingerprint(), registry, results, evidence, ctx)
}

/// Aggregate, score, and recommend. Nothing is returned until every stage
/// has finished, so cancellation never exposes a partial report.
pub(crate) fn assemble(
    snapshot_fingerprint: &str,
    registry: &GateRegistry,
    results: Vec<GateResult>,
    evidence: &EvidenceSet,
    ctx: &RunContext<'_>,
) -> Result<ComplianceReport, EngineError> {
    ctx.check_cancelled()?;
    let thresholds = StatusThresholds::from_config(&ctx.config.scoring);
    let gates = EvidenceAggregator::new(&ctx.config.evidence, thresholds).aggregate(
        registry,
        results,
        evidence,
    );

    ctx.check_cancelled()?;
    let executive_summary = ComplianceScorer::new(&ctx.config.scoring).score(&gates)?;
    let recommendations = RecommendationGenerator::new(registry).generate(&gates);
    let report = ComplianceReport {
        metadata: ReportMetadata {
            snapshot_fingerprint: snapshot_fingerprint.to_string(),
            registry_version: registry.version().to_string(),
            evaluated_at: ctx.evaluated_at,
        },
        executive_summary,
        evidence_summary: EvidenceSummary::from_results(&gates, evidence),
        degraded_sources: evidence.degraded(),
        recommendations,
        gates,
    };

    info!(
        fingerprint = %report.metadata.snapshot_fingerprint,
        registry = %report.metadata.registry_version,
        score = report.executive_summary.overall_score,
        risk = %report.executive_summary.risk_level,
        degraded = report.degraded_sources.len(),
        "compliance report produced"
    );
    Ok(report)
}
