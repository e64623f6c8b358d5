//! Merges external evidence into pattern-based gate results.

use hardgate_core::config::EvidenceConfig;
use hardgate_core::types::collections::{FxHashMap, FxHashSet};
use tracing::debug;

use super::types::{EvidenceItem, EvidenceSet, SourceStatus};
use crate::evaluator::score_evidence;
use crate::gates::{GateRegistry, GateResult, GateStatus, StatusThresholds};

/// Appends external evidence to evaluated gates and discounts confidence for
/// degraded sources.
///
/// Aggregation is idempotent: items are keyed by (source id, excerpt hash),
/// degraded sources are recorded once per gate, and score and confidence are
/// recomputed from the gate's full evidence list rather than adjusted.
pub struct EvidenceAggregator<'a> {
    config: &'a EvidenceConfig,
    thresholds: StatusThresholds,
}

impl<'a> EvidenceAggregator<'a> {
    pub fn new(config: &'a EvidenceConfig, thresholds: StatusThresholds) -> Self {
        Self { config, thresholds }
    }

    pub fn aggregate(
        &self,
        registry: &GateRegistry,
        mut results: Vec<GateResult>,
        evidence: &EvidenceSet,
    ) -> Vec<GateResult> {
        let index: FxHashMap<String, usize> = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        let mut additions: Vec<Vec<&EvidenceItem>> = vec![Vec::new(); results.len()];
        for source in evidence.sources() {
            if source.status == SourceStatus::Unavailable {
                continue;
            }
            for item in &source.items {
                match index.get(item.gate_id.as_str()) {
                    Some(&i) if results[i].status.is_scored() => additions[i].push(item),
                    Some(&i) => debug!(
                        source = %source.source_id,
                        gate_id = %item.gate_id,
                        status = %results[i].status,
                        "dropping external evidence for unscored gate"
                    ),
                    None => debug!(
                        source = %source.source_id,
                        gate_id = %item.gate_id,
                        "dropping external evidence for unknown gate"
                    ),
                }
            }
        }

        let statuses: FxHashMap<&str, SourceStatus> = evidence
            .sources()
            .iter()
            .map(|s| (s.source_id.as_str(), s.status))
            .collect();
        let weight = self.config.effective_external_hit_weight();

        for (result, items) in results.iter_mut().zip(additions) {
            if !result.status.is_scored() {
                continue;
            }
            let Some(gate) = registry.get(&result.id) else {
                continue;
            };

            for source in evidence.sources() {
                if source.status.is_degraded()
                    && source.covers_gate(&result.id)
                    && !result.degraded_sources.contains(&source.source_id)
                {
                    result.degraded_sources.push(source.source_id.clone());
                }
            }

            let mut seen: FxHashSet<(String, u64)> =
                result.evidence.iter().map(EvidenceItem::dedup_key).collect();
            for item in items {
                if !seen.insert(item.dedup_key()) {
                    continue;
                }
                let mut merged = item.clone();
                merged.reliability = merged.reliability.clamp(0.0, 1.0);
                merged.contribution = merged.reliability * weight;
                result.evidence.push(merged);
            }

            result.score = score_evidence(gate.evaluator.baseline(), &result.evidence);
            result.status = GateStatus::from_score(result.score, &self.thresholds);
            result.confidence = result
                .degraded_sources
                .iter()
                .map(|id| {
                    statuses
                        .get(id.as_str())
                        .copied()
                        .unwrap_or(SourceStatus::Unavailable)
                        .discount(self.config)
                })
                .product();
        }

        results
    }
}
