//! Evidence items, source statuses, and the per-run evidence set.

use chrono::{DateTime, TimeDelta, Utc};
use hardgate_core::config::EvidenceConfig;
use hardgate_core::errors::EvidenceSourceError;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::gates::{GateId, Polarity};

/// Source id used for evidence produced by the pattern evaluator.
pub const PATTERN_SOURCE: &str = "pattern";

/// Maximum excerpt length kept on an evidence item, in characters.
pub const MAX_EXCERPT_CHARS: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    PatternMatch,
    External,
}

/// One unit of supporting or contradicting data for a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub source_id: String,
    pub kind: EvidenceKind,
    pub gate_id: GateId,
    pub timestamp: DateTime<Utc>,
    /// Source reliability in [0, 1].
    pub reliability: f64,
    pub polarity: Polarity,
    pub excerpt: String,
    /// `path:line` for pattern matches; a source-defined locator otherwise.
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<String>,
    /// Score points this item adds (positive) or removes (negative).
    #[serde(default)]
    pub contribution: f64,
}

impl EvidenceItem {
    /// An external item as returned by an evidence source. The contribution is
    /// assigned during aggregation.
    pub fn external(
        source_id: impl Into<String>,
        gate_id: impl Into<GateId>,
        timestamp: DateTime<Utc>,
        reliability: f64,
        polarity: Polarity,
        excerpt: impl AsRef<str>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            kind: EvidenceKind::External,
            gate_id: gate_id.into(),
            timestamp,
            reliability,
            polarity,
            excerpt: truncate_excerpt(excerpt.as_ref()),
            reference: reference.into(),
            pattern_id: None,
            contribution: 0.0,
        }
    }

    /// xxh3 of the excerpt; with `source_id` this is the dedup key.
    pub fn excerpt_hash(&self) -> u64 {
        xxh3_64(self.excerpt.as_bytes())
    }

    pub fn dedup_key(&self) -> (String, u64) {
        (self.source_id.clone(), self.excerpt_hash())
    }
}

/// Trim and cap an excerpt at `MAX_EXCERPT_CHARS` characters.
pub fn truncate_excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    #[default]
    Ok,
    Unavailable,
    Partial,
}

impl SourceStatus {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Ok)
    }

    /// Confidence multiplier applied to gates covered by a source in this state.
    pub fn discount(&self, config: &EvidenceConfig) -> f64 {
        match self {
            Self::Ok => 1.0,
            Self::Unavailable => config.effective_unavailable_discount(),
            Self::Partial => config.effective_partial_discount(),
        }
    }
}

/// Everything one source returned for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEvidence {
    pub source_id: String,
    pub status: SourceStatus,
    pub items: Vec<EvidenceItem>,
    /// Gates this source informs. `None` means every evaluated gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers: Option<Vec<GateId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceEvidence {
    pub fn ok(source_id: impl Into<String>, items: Vec<EvidenceItem>) -> Self {
        Self {
            source_id: source_id.into(),
            status: SourceStatus::Ok,
            items,
            covers: None,
            error: None,
        }
    }

    pub fn unavailable(source_id: impl Into<String>, error: &EvidenceSourceError) -> Self {
        Self {
            source_id: source_id.into(),
            status: SourceStatus::Unavailable,
            items: Vec::new(),
            covers: None,
            error: Some(error.to_string()),
        }
    }

    pub fn with_status(mut self, status: SourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn covering(mut self, gates: Option<Vec<GateId>>) -> Self {
        self.covers = gates;
        self
    }

    pub fn covers_gate(&self, gate_id: &str) -> bool {
        self.covers
            .as_ref()
            .map_or(true, |gates| gates.iter().any(|g| g == gate_id))
    }
}

/// External evidence for one run, in source registration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvidenceSet {
    sources: Vec<SourceEvidence>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: SourceEvidence) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[SourceEvidence] {
        &self.sources
    }

    pub fn get(&self, source_id: &str) -> Option<&SourceEvidence> {
        self.sources.iter().find(|s| s.source_id == source_id)
    }

    /// Ids of sources that were unavailable or partial, in registration order.
    pub fn degraded(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.status.is_degraded())
            .map(|s| s.source_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<SourceEvidence> for EvidenceSet {
    fn from_iter<T: IntoIterator<Item = SourceEvidence>>(iter: T) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}

/// Closed time window evidence is fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EvidenceSourceError> {
        if start > end {
            return Err(EvidenceSourceError::InvalidTimeRange(format!(
                "{start} is after {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window ending at `end` and reaching back by a span such as `24h`, `7d`,
    /// `2w`, or `30m`.
    pub fn lookback(span: &str, end: DateTime<Utc>) -> Result<Self, EvidenceSourceError> {
        let invalid = || EvidenceSourceError::InvalidTimeRange(span.to_string());
        let span = span.trim();
        let unit = span.chars().last().ok_or_else(invalid)?;
        let amount: i64 = span[..span.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;
        if amount <= 0 {
            return Err(invalid());
        }
        let delta = match unit {
            'm' => TimeDelta::try_minutes(amount),
            'h' => TimeDelta::try_hours(amount),
            'd' => TimeDelta::try_days(amount),
            'w' => TimeDelta::try_weeks(amount),
            _ => None,
        }
        .ok_or_else(invalid)?;
        let start = end.checked_sub_signed(delta).ok_or_else(invalid)?;
        Self::new(start, end)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}
