//! Pattern evaluation: compiled matchers, hit scoring, and the parallel evaluator.

pub mod matcher;
pub mod pattern_evaluator;
pub mod saturating;

pub use matcher::CompiledPattern;
pub use pattern_evaluator::PatternEvaluator;
pub use saturating::{round2, score_evidence, score_hits, RawHit, SaturationParams, ScoredHit};
