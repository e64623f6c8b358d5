//! External evidence: sources, concurrent collection, and aggregation into gate results.

pub mod aggregator;
pub mod collector;
pub mod types;

pub use aggregator::EvidenceAggregator;
pub use collector::{
    EvidenceCollector, EvidenceSource, JsonFileEvidenceSource, PendingEvidence, SourceFetch,
    StaticEvidenceSource,
};
pub use types::{
    truncate_excerpt, EvidenceItem, EvidenceKind, EvidenceSet, SourceEvidence, SourceStatus,
    TimeRange, MAX_EXCERPT_CHARS, PATTERN_SOURCE,
};
