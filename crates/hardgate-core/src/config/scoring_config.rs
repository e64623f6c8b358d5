//! Scoring constants.
//!
//! The status thresholds, risk bands, and saturation parameters are tunable;
//! none of them is a hard invariant of the engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum score for PASS. Default: 80.
    pub pass_threshold: Option<f64>,
    /// Minimum score for PARTIAL. Default: 40.
    pub partial_threshold: Option<f64>,
    /// Minimum overall score for the Low risk band. Default: 85.
    pub risk_low_threshold: Option<f64>,
    /// Minimum overall score for the Medium risk band. Default: 60.
    pub risk_medium_threshold: Option<f64>,
    /// Score contributed by a pattern hit in a not-yet-credited file. Default: 20.
    pub hit_weight: Option<f64>,
    /// Multiplier applied per redundant hit in an already-credited file. Default: 0.5.
    pub redundant_hit_decay: Option<f64>,
    /// Score removed per negative-polarity hit. Default: 25.
    pub negative_penalty: Option<f64>,
    /// Line window used to collapse overlapping matches. Default: 1 (per line).
    pub dedup_window_lines: Option<u32>,
}

impl ScoringConfig {
    pub fn effective_pass_threshold(&self) -> f64 {
        self.pass_threshold.unwrap_or(80.0)
    }

    pub fn effective_partial_threshold(&self) -> f64 {
        self.partial_threshold.unwrap_or(40.0)
    }

    pub fn effective_risk_low_threshold(&self) -> f64 {
        self.risk_low_threshold.unwrap_or(85.0)
    }

    pub fn effective_risk_medium_threshold(&self) -> f64 {
        self.risk_medium_threshold.unwrap_or(60.0)
    }

    pub fn effective_hit_weight(&self) -> f64 {
        self.hit_weight.unwrap_or(20.0)
    }

    pub fn effective_redundant_hit_decay(&self) -> f64 {
        self.redundant_hit_decay.unwrap_or(0.5)
    }

    pub fn effective_negative_penalty(&self) -> f64 {
        self.negative_penalty.unwrap_or(25.0)
    }

    pub fn effective_dedup_window_lines(&self) -> u32 {
        self.dedup_window_lines.unwrap_or(1).max(1)
    }
}
