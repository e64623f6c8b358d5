//! Tracing subscriber setup for hosts embedding the engine.

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, TelemetryConfig};

/// Install a global `tracing` subscriber from the telemetry config.
///
/// Returns `false` when a global subscriber is already installed, which makes
/// repeated calls (tests, multiple hosts in one process) harmless.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let requested = config.effective_filter();
    let (filter, rejected) = match EnvFilter::try_new(requested) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(TelemetryConfig::DEFAULT_FILTER), Some(e)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let format = config.effective_format();
    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    }
    .is_ok();

    if installed {
        if let Some(e) = rejected {
            warn!(filter = requested, error = %e, "invalid log filter, using the default");
        }
        debug!(?format, "tracing subscriber installed");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_noop() {
        let config = TelemetryConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn invalid_filter_falls_back() {
        let config = TelemetryConfig {
            filter: Some("[[[not a filter".to_string()),
            format: None,
        };
        // Must not panic regardless of whether a subscriber is already set.
        let _ = init_tracing(&config);
    }
}
