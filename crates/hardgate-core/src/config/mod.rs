//! Configuration system for Hardgate.
//! TOML-based, layered resolution: overrides > env > project > defaults.
//!
//! The resolved `HardgateConfig` is built once by the host and then passed by
//! reference; no engine component reads process state on its own.

pub mod engine_config;
pub mod evidence_config;
pub mod hardgate_config;
pub mod scan_config;
pub mod scoring_config;
pub mod telemetry_config;

pub use engine_config::EngineConfig;
pub use evidence_config::EvidenceConfig;
pub use hardgate_config::{ConfigOverrides, HardgateConfig};
pub use scan_config::{ScanConfig, ScanDepth};
pub use scoring_config::ScoringConfig;
pub use telemetry_config::{LogFormat, TelemetryConfig};
