//! Logging configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `"hardgate_analysis=debug"`.
    pub filter: Option<String>,
    /// Output format. Default: plain.
    pub format: Option<LogFormat>,
}

impl TelemetryConfig {
    pub const DEFAULT_FILTER: &'static str = "hardgate_core=info,hardgate_analysis=info";

    pub fn effective_filter(&self) -> &str {
        self.filter.as_deref().unwrap_or(Self::DEFAULT_FILTER)
    }

    pub fn effective_format(&self) -> LogFormat {
        self.format.unwrap_or_default()
    }
}
