//! Concurrent evidence collection with per-source timeouts.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use hardgate_core::config::EvidenceConfig;
use hardgate_core::errors::{EngineError, EvidenceSourceError};
use hardgate_core::traits::{Cancellable, CancellationToken};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::types::{EvidenceItem, EvidenceSet, SourceEvidence, SourceStatus, TimeRange};
use crate::gates::{GateId, Polarity};

/// What a source returned: its items and whether the fetch was complete.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFetch {
    pub items: Vec<EvidenceItem>,
    pub status: SourceStatus,
}

impl SourceFetch {
    pub fn complete(items: Vec<EvidenceItem>) -> Self {
        Self {
            items,
            status: SourceStatus::Ok,
        }
    }
}

/// Client for one external evidence system (log platform, APM, web portal).
pub trait EvidenceSource: Send + Sync {
    fn id(&self) -> &str;

    /// Gates this source informs. `None` means every evaluated gate.
    fn covers(&self) -> Option<Vec<GateId>> {
        None
    }

    fn fetch(&self, app_id: &str, range: &TimeRange) -> Result<SourceFetch, EvidenceSourceError>;
}

/// Fixed evidence, optionally delayed or failing. Useful for replaying
/// captured evidence and for exercising timeout handling.
#[derive(Debug, Clone)]
pub struct StaticEvidenceSource {
    id: String,
    items: Vec<EvidenceItem>,
    status: SourceStatus,
    covers: Option<Vec<GateId>>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl StaticEvidenceSource {
    pub fn new(id: impl Into<String>, items: Vec<EvidenceItem>) -> Self {
        Self {
            id: id.into(),
            items,
            status: SourceStatus::Ok,
            covers: None,
            delay: None,
            failure: None,
        }
    }

    pub fn with_status(mut self, status: SourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn covering(mut self, gates: Vec<GateId>) -> Self {
        self.covers = Some(gates);
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

impl EvidenceSource for StaticEvidenceSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn covers(&self) -> Option<Vec<GateId>> {
        self.covers.clone()
    }

    fn fetch(&self, _app_id: &str, range: &TimeRange) -> Result<SourceFetch, EvidenceSourceError> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if let Some(message) = &self.failure {
            return Err(EvidenceSourceError::Unavailable {
                source_id: self.id.clone(),
                message: message.clone(),
            });
        }
        Ok(SourceFetch {
            items: self
                .items
                .iter()
                .filter(|item| range.contains(item.timestamp))
                .cloned()
                .collect(),
            status: self.status,
        })
    }
}

/// Evidence exported from an external system as a JSON array of records.
///
/// ```json
/// [{ "app": "billing", "gate": "RETRY_LOGIC", "timestamp": "2025-06-01T00:00:00Z",
///    "reliability": 0.9, "polarity": "positive", "excerpt": "...", "reference": "..." }]
/// ```
///
/// Records for other applications or outside the time range are skipped.
/// Malformed records make the fetch partial rather than failing it.
#[derive(Debug, Clone)]
pub struct JsonFileEvidenceSource {
    id: String,
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ExportedRecord {
    #[serde(default)]
    app: Option<String>,
    gate: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default = "full_reliability")]
    reliability: f64,
    #[serde(default)]
    polarity: Polarity,
    excerpt: String,
    #[serde(default)]
    reference: String,
}

fn full_reliability() -> f64 {
    1.0
}

impl JsonFileEvidenceSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

impl EvidenceSource for JsonFileEvidenceSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, app_id: &str, range: &TimeRange) -> Result<SourceFetch, EvidenceSourceError> {
        let unavailable = |message: String| EvidenceSourceError::Unavailable {
            source_id: self.id.clone(),
            message,
        };
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| unavailable(format!("{}: {e}", self.path.display())))?;
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| unavailable(e.to_string()))?;

        let mut status = SourceStatus::Ok;
        let mut items = Vec::new();
        for value in records {
            let record: ExportedRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(e) => {
                    debug!(source = %self.id, error = %e, "skipping malformed evidence record");
                    status = SourceStatus::Partial;
                    continue;
                }
            };
            if record.app.as_deref().is_some_and(|app| app != app_id)
                || !range.contains(record.timestamp)
            {
                continue;
            }
            items.push(EvidenceItem::external(
                &self.id,
                record.gate,
                record.timestamp,
                record.reliability,
                record.polarity,
                record.excerpt,
                record.reference,
            ));
        }
        Ok(SourceFetch { items, status })
    }
}

/// Fans evidence fetches out to one thread per source.
pub struct EvidenceCollector<'a> {
    config: &'a EvidenceConfig,
}

/// Fetches in flight, joined in source registration order.
pub struct PendingEvidence {
    started: Instant,
    poll: Duration,
    pending: Vec<PendingSource>,
}

struct PendingSource {
    id: String,
    covers: Option<Vec<GateId>>,
    timeout: Duration,
    rx: Receiver<Result<SourceFetch, EvidenceSourceError>>,
}

impl<'a> EvidenceCollector<'a> {
    pub fn new(config: &'a EvidenceConfig) -> Self {
        Self { config }
    }

    /// Start every fetch. Each source gets its own deadline measured from now.
    pub fn start(
        &self,
        sources: &[Arc<dyn EvidenceSource>],
        app_id: &str,
        range: TimeRange,
    ) -> PendingEvidence {
        let started = Instant::now();
        let pending = sources
            .iter()
            .map(|source| {
                let (tx, rx) = bounded(1);
                let worker = Arc::clone(source);
                let app = app_id.to_string();
                let id = source.id().to_string();
                let spawned = thread::Builder::new()
                    .name(format!("evidence-{id}"))
                    .spawn(move || {
                        // The receiver may have given up already.
                        let _ = tx.send(worker.fetch(&app, &range));
                    });
                if let Err(e) = spawned {
                    warn!(source = %id, error = %e, "failed to spawn evidence fetch");
                }
                PendingSource {
                    timeout: self.config.effective_timeout(&id),
                    covers: source.covers(),
                    id,
                    rx,
                }
            })
            .collect();
        PendingEvidence {
            started,
            poll: self.config.effective_poll_interval(),
            pending,
        }
    }

    /// Start and join in one call.
    pub fn collect(
        &self,
        sources: &[Arc<dyn EvidenceSource>],
        app_id: &str,
        range: TimeRange,
        cancel: &CancellationToken,
    ) -> Result<EvidenceSet, EngineError> {
        self.start(sources, app_id, range).join(cancel)
    }
}

impl PendingEvidence {
    /// Wait for every source up to its deadline. Late or failed sources are
    /// recorded as unavailable; slow sources never delay the deadline of others.
    pub fn join(self, cancel: &CancellationToken) -> Result<EvidenceSet, EngineError> {
        let mut set = EvidenceSet::new();
        for source in self.pending {
            let deadline = self.started + source.timeout;
            let outcome = loop {
                if cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }
                let now = Instant::now();
                if now >= deadline {
                    break Err(EvidenceSourceError::Timeout {
                        source_id: source.id.clone(),
                        timeout_ms: source.timeout.as_millis() as u64,
                    });
                }
                match source.rx.recv_timeout(self.poll.min(deadline - now)) {
                    Ok(result) => break result,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => {
                        break Err(EvidenceSourceError::Unavailable {
                            source_id: source.id.clone(),
                            message: "fetch ended without a result".to_string(),
                        })
                    }
                }
            };
            let evidence = match outcome {
                Ok(fetch) => {
                    debug!(
                        source = %source.id,
                        items = fetch.items.len(),
                        status = ?fetch.status,
                        "evidence source returned"
                    );
                    SourceEvidence::ok(source.id, fetch.items).with_status(fetch.status)
                }
                Err(e) => {
                    info!(source = %source.id, error = %e, "evidence source degraded");
                    SourceEvidence::unavailable(source.id, &e)
                }
            };
            set.push(evidence.covering(source.covers));
        }
        Ok(set)
    }
}
