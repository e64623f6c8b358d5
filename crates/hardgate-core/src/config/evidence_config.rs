//! External evidence configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Timeout applied to every source without an explicit entry. Default: 5000ms.
    pub source_timeout_ms: Option<u64>,
    /// Per-source timeout overrides, keyed by source id.
    pub source_timeouts: HashMap<String, u64>,
    /// Score contributed by an external item of reliability 1.0. Default: 15.
    pub external_hit_weight: Option<f64>,
    /// Confidence multiplier for each unavailable source. Default: 0.8.
    pub unavailable_discount: Option<f64>,
    /// Confidence multiplier for each partially responsive source. Default: 0.9.
    pub partial_discount: Option<f64>,
    /// How often a waiting collector re-checks cancellation. Default: 50ms.
    pub poll_interval_ms: Option<u64>,
}

impl EvidenceConfig {
    pub fn effective_timeout(&self, source_id: &str) -> Duration {
        let ms = self
            .source_timeouts
            .get(source_id)
            .copied()
            .or(self.source_timeout_ms)
            .unwrap_or(5_000);
        Duration::from_millis(ms)
    }

    pub fn effective_external_hit_weight(&self) -> f64 {
        self.external_hit_weight.unwrap_or(15.0)
    }

    pub fn effective_unavailable_discount(&self) -> f64 {
        self.unavailable_discount.unwrap_or(0.8)
    }

    pub fn effective_partial_discount(&self) -> f64 {
        self.partial_discount.unwrap_or(0.9)
    }

    pub fn effective_poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(50).max(1))
    }
}
