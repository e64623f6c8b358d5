//! Engine runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Gate evaluation worker threads. Default: available parallelism.
    pub worker_threads: Option<usize>,
    /// Maximum cached reports. Default: 64.
    pub cache_capacity: Option<u64>,
    /// Cached report lifetime in seconds. Default: 600.
    pub cache_ttl_secs: Option<u64>,
}

impl EngineConfig {
    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(64)
    }

    pub fn effective_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(600))
    }
}
