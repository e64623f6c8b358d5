//! Top-level Hardgate configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    EngineConfig, EvidenceConfig, LogFormat, ScanConfig, ScanDepth, ScoringConfig, TelemetryConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (`ConfigOverrides`)
/// 2. Environment variables (`HARDGATE_*`), passed in by the host
/// 3. Project config (`hardgate.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HardgateConfig {
    pub scan: ScanConfig,
    pub scoring: ScoringConfig,
    pub evidence: EvidenceConfig,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

/// Host-supplied overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub worker_threads: Option<usize>,
    pub scan_depth: Option<ScanDepth>,
    pub source_timeout_ms: Option<u64>,
    pub pass_threshold: Option<f64>,
    pub partial_threshold: Option<f64>,
    pub log_filter: Option<String>,
}

impl HardgateConfig {
    pub const PROJECT_FILE: &'static str = "hardgate.toml";

    /// Resolve configuration for a project root.
    ///
    /// `env` is the set of environment variables to consider; hosts normally
    /// pass `std::env::vars()`. Only `HARDGATE_*` keys are read.
    pub fn load<I, K, V>(
        root: &Path,
        env: I,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        let project_config_path = root.join(Self::PROJECT_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config, env);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &HardgateConfig) -> Result<(), ConfigError> {
        let s = &config.scoring;
        for (field, value) in [
            ("scoring.pass_threshold", s.pass_threshold),
            ("scoring.partial_threshold", s.partial_threshold),
            ("scoring.risk_low_threshold", s.risk_low_threshold),
            ("scoring.risk_medium_threshold", s.risk_medium_threshold),
        ] {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    return Err(invalid(field, "must be between 0 and 100"));
                }
            }
        }
        if s.effective_partial_threshold() > s.effective_pass_threshold() {
            return Err(invalid(
                "scoring.partial_threshold",
                "must not exceed scoring.pass_threshold",
            ));
        }
        if s.effective_risk_medium_threshold() > s.effective_risk_low_threshold() {
            return Err(invalid(
                "scoring.risk_medium_threshold",
                "must not exceed scoring.risk_low_threshold",
            ));
        }
        if s.effective_hit_weight() <= 0.0 {
            return Err(invalid("scoring.hit_weight", "must be greater than 0"));
        }
        let decay = s.effective_redundant_hit_decay();
        if !(decay > 0.0 && decay <= 1.0) {
            return Err(invalid("scoring.redundant_hit_decay", "must be in (0, 1]"));
        }
        if s.effective_negative_penalty() < 0.0 {
            return Err(invalid("scoring.negative_penalty", "must not be negative"));
        }

        let e = &config.evidence;
        for (field, value) in [
            ("evidence.unavailable_discount", e.unavailable_discount),
            ("evidence.partial_discount", e.partial_discount),
        ] {
            if let Some(v) = value {
                // A degraded source must always leave confidence strictly below 1.0.
                if !(0.0..1.0).contains(&v) {
                    return Err(invalid(field, "must be in [0, 1)"));
                }
            }
        }
        if e.external_hit_weight.is_some_and(|w| w < 0.0) {
            return Err(invalid("evidence.external_hit_weight", "must not be negative"));
        }
        if e.source_timeout_ms == Some(0) || e.source_timeouts.values().any(|&ms| ms == 0) {
            return Err(invalid("evidence.source_timeout_ms", "must be greater than 0"));
        }

        if config.engine.worker_threads == Some(0) {
            return Err(invalid("engine.worker_threads", "must be greater than 0"));
        }
        if config.scan.max_file_size == Some(0) {
            return Err(invalid("scan.max_file_size", "must be greater than 0"));
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut HardgateConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: HardgateConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut HardgateConfig, other: &HardgateConfig) {
        // Scan
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if !other.scan.extra_ignore.is_empty() {
            base.scan.extra_ignore = other.scan.extra_ignore.clone();
        }
        if other.scan.follow_symlinks.is_some() {
            base.scan.follow_symlinks = other.scan.follow_symlinks;
        }
        if other.scan.respect_gitignore.is_some() {
            base.scan.respect_gitignore = other.scan.respect_gitignore;
        }
        if other.scan.depth.is_some() {
            base.scan.depth = other.scan.depth;
        }

        // Scoring
        let (b, o) = (&mut base.scoring, &other.scoring);
        b.pass_threshold = o.pass_threshold.or(b.pass_threshold);
        b.partial_threshold = o.partial_threshold.or(b.partial_threshold);
        b.risk_low_threshold = o.risk_low_threshold.or(b.risk_low_threshold);
        b.risk_medium_threshold = o.risk_medium_threshold.or(b.risk_medium_threshold);
        b.hit_weight = o.hit_weight.or(b.hit_weight);
        b.redundant_hit_decay = o.redundant_hit_decay.or(b.redundant_hit_decay);
        b.negative_penalty = o.negative_penalty.or(b.negative_penalty);
        b.dedup_window_lines = o.dedup_window_lines.or(b.dedup_window_lines);

        // Evidence
        let (b, o) = (&mut base.evidence, &other.evidence);
        b.source_timeout_ms = o.source_timeout_ms.or(b.source_timeout_ms);
        for (source, ms) in &o.source_timeouts {
            b.source_timeouts.insert(source.clone(), *ms);
        }
        b.external_hit_weight = o.external_hit_weight.or(b.external_hit_weight);
        b.unavailable_discount = o.unavailable_discount.or(b.unavailable_discount);
        b.partial_discount = o.partial_discount.or(b.partial_discount);
        b.poll_interval_ms = o.poll_interval_ms.or(b.poll_interval_ms);

        // Engine
        let (b, o) = (&mut base.engine, &other.engine);
        b.worker_threads = o.worker_threads.or(b.worker_threads);
        b.cache_capacity = o.cache_capacity.or(b.cache_capacity);
        b.cache_ttl_secs = o.cache_ttl_secs.or(b.cache_ttl_secs);

        // Telemetry
        if other.telemetry.filter.is_some() {
            base.telemetry.filter = other.telemetry.filter.clone();
        }
        if other.telemetry.format.is_some() {
            base.telemetry.format = other.telemetry.format;
        }
    }

    /// Apply `HARDGATE_*` variables. Unparseable values are ignored.
    fn apply_env_overrides<I, K, V>(config: &mut HardgateConfig, env: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, val) in env {
            let val = val.as_ref();
            match key.as_ref() {
                "HARDGATE_SCAN_MAX_FILE_SIZE" => {
                    if let Ok(v) = val.parse::<u64>() {
                        config.scan.max_file_size = Some(v);
                    }
                }
                "HARDGATE_SCAN_DEPTH" => {
                    if let Some(depth) = ScanDepth::parse(val) {
                        config.scan.depth = Some(depth);
                    }
                }
                "HARDGATE_ENGINE_WORKER_THREADS" => {
                    if let Ok(v) = val.parse::<usize>() {
                        config.engine.worker_threads = Some(v);
                    }
                }
                "HARDGATE_EVIDENCE_SOURCE_TIMEOUT_MS" => {
                    if let Ok(v) = val.parse::<u64>() {
                        config.evidence.source_timeout_ms = Some(v);
                    }
                }
                "HARDGATE_SCORING_PASS_THRESHOLD" => {
                    if let Ok(v) = val.parse::<f64>() {
                        config.scoring.pass_threshold = Some(v);
                    }
                }
                "HARDGATE_SCORING_PARTIAL_THRESHOLD" => {
                    if let Ok(v) = val.parse::<f64>() {
                        config.scoring.partial_threshold = Some(v);
                    }
                }
                "HARDGATE_LOG" => {
                    config.telemetry.filter = Some(val.to_string());
                }
                "HARDGATE_LOG_FORMAT" => match val {
                    "json" => config.telemetry.format = Some(LogFormat::Json),
                    "plain" => config.telemetry.format = Some(LogFormat::Plain),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    fn apply_overrides(config: &mut HardgateConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.worker_threads {
            config.engine.worker_threads = Some(v);
        }
        if let Some(v) = overrides.scan_depth {
            config.scan.depth = Some(v);
        }
        if let Some(v) = overrides.source_timeout_ms {
            config.evidence.source_timeout_ms = Some(v);
        }
        if let Some(v) = overrides.pass_threshold {
            config.scoring.pass_threshold = Some(v);
        }
        if let Some(v) = overrides.partial_threshold {
            config.scoring.partial_threshold = Some(v);
        }
        if let Some(ref v) = overrides.log_filter {
            config.telemetry.filter = Some(v.clone());
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
