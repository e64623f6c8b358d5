//! Compliance scoring and recommendation ranking.

pub mod recommendations;
pub mod scorer;

pub use recommendations::{Recommendation, RecommendationGenerator};
pub use scorer::{ComplianceScorer, ExecutiveSummary, RiskLevel};
