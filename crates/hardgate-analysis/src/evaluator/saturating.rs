//! Hit deduplication and the saturating score function.

use hardgate_core::config::ScoringConfig;
use hardgate_core::types::collections::{FxHashMap, FxHashSet};

use crate::evidence::EvidenceItem;
use crate::gates::Polarity;

/// A raw pattern match before deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    /// Index of the pattern within its gate.
    pub pattern: usize,
    pub polarity: Polarity,
    /// Full weight of a positive hit, or the cost of a negative one.
    pub weight: f64,
    pub path: String,
    /// 1-based; 0 for path matches.
    pub line: usize,
    pub excerpt: String,
}

/// A hit that survived deduplication, with its score contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
    pub hit: RawHit,
    pub contribution: f64,
}

/// Scoring knobs resolved from `ScoringConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationParams {
    pub decay: f64,
    pub window: usize,
}

impl SaturationParams {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            decay: config.effective_redundant_hit_decay(),
            window: config.effective_dedup_window_lines().max(1) as usize,
        }
    }
}

impl Default for SaturationParams {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

fn bucket(line: usize, window: usize) -> usize {
    line.saturating_sub(1) / window
}

/// Deduplicate hits and assign contributions. Input order is preserved.
///
/// - A pattern counts once per (file, line bucket).
/// - A negative hit suppresses positive hits in the same (file, bucket).
/// - The first positive hit of a pattern in a file earns its full weight; the
///   k-th further one earns `weight * decay^k`.
/// - A negative hit costs its full weight.
pub fn score_hits(hits: Vec<RawHit>, params: &SaturationParams) -> Vec<ScoredHit> {
    let mut seen: FxHashSet<(usize, String, usize)> = FxHashSet::default();
    let mut unique = Vec::with_capacity(hits.len());
    for hit in hits {
        if seen.insert((hit.pattern, hit.path.clone(), bucket(hit.line, params.window))) {
            unique.push(hit);
        }
    }

    let negative_buckets: FxHashSet<(&str, usize)> = unique
        .iter()
        .filter(|h| h.polarity == Polarity::Negative)
        .map(|h| (h.path.as_str(), bucket(h.line, params.window)))
        .collect();
    let suppressed: Vec<bool> = unique
        .iter()
        .map(|h| {
            h.polarity == Polarity::Positive
                && negative_buckets.contains(&(h.path.as_str(), bucket(h.line, params.window)))
        })
        .collect();

    let mut credited: FxHashMap<(usize, String), i32> = FxHashMap::default();
    unique
        .into_iter()
        .zip(suppressed)
        .filter(|(_, suppressed)| !suppressed)
        .map(|(hit, _)| {
            let contribution = match hit.polarity {
                Polarity::Positive => {
                    let k = credited.entry((hit.pattern, hit.path.clone())).or_insert(0);
                    let c = hit.weight * params.decay.powi(*k);
                    *k += 1;
                    c
                }
                Polarity::Negative => hit.weight,
            };
            ScoredHit { hit, contribution }
        })
        .collect()
}

/// Score from a baseline plus evidence contributions:
/// `clamp(min(100, baseline + positives) - negatives, 0, 100)`, two decimals.
pub fn score_evidence(baseline: f64, evidence: &[EvidenceItem]) -> f64 {
    let (positive, negative) = evidence.iter().fold((0.0, 0.0), |(p, n), item| {
        match item.polarity {
            Polarity::Positive => (p + item.contribution.max(0.0), n),
            Polarity::Negative => (p, n + item.contribution.max(0.0)),
        }
    });
    round2(((baseline + positive).min(100.0) - negative).clamp(0.0, 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
