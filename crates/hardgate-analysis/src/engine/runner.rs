//! Long-lived engine: registry store, evidence sources, worker pool, report cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hardgate_core::config::{HardgateConfig, ScanDepth};
use hardgate_core::errors::EngineError;
use hardgate_core::traits::{Cancellable, CancellationToken};
use hardgate_core::types::Selection;
use moka::sync::Cache;
use tracing::{debug, warn};

use super::evaluate::{assemble, RunContext};
use crate::detection::TechnologyDetector;
use crate::evidence::{EvidenceCollector, EvidenceSource, TimeRange};
use crate::gates::{GateRegistry, RegistryStore};
use crate::report::ComplianceReport;
use crate::scanner::{Snapshot, SnapshotProvider};

/// One evaluation request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Passed to the snapshot provider (a path, a revision, ...).
    pub reference: String,
    /// Application id passed to evidence sources.
    pub app_id: String,
    pub time_range: TimeRange,
    pub evaluated_at: DateTime<Utc>,
    /// Overrides `scan.depth` from the engine config.
    pub scan_depth: Option<ScanDepth>,
    /// Gates to evaluate. The rest are reported NOT_APPLICABLE.
    pub gates: Selection,
    /// Registered evidence sources to query, by id.
    pub sources: Selection,
}

impl RunRequest {
    /// A request covering every gate and every registered source.
    pub fn new(
        reference: impl Into<String>,
        app_id: impl Into<String>,
        time_range: TimeRange,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reference: reference.into(),
            app_id: app_id.into(),
            time_range,
            evaluated_at,
            scan_depth: None,
            gates: Selection::All,
            sources: Selection::All,
        }
    }

    pub fn with_scan_depth(mut self, depth: ScanDepth) -> Self {
        self.scan_depth = Some(depth);
        self
    }

    pub fn with_gates(mut self, gates: Selection) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_sources(mut self, sources: Selection) -> Self {
        self.sources = sources;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReportKey {
    fingerprint: String,
    registry_version: String,
    app_id: String,
    range: TimeRange,
    depth: ScanDepth,
    gates: Selection,
    sources: Selection,
}

/// Host-facing engine.
///
/// Concurrent `run` calls for the same snapshot fingerprint, registry version,
/// evidence window, depth, and selections are coalesced: one computes, the
/// others wait for and share its report. Failed runs are not cached.
///
/// A caller only ever sees `Cancelled` for its own token. When the computing
/// caller cancels, a waiter that did not cancel starts the computation again.
pub struct Engine {
    config: HardgateConfig,
    registry: RegistryStore,
    provider: Arc<dyn SnapshotProvider>,
    sources: Vec<Arc<dyn EvidenceSource>>,
    pool: rayon::ThreadPool,
    reports: Cache<ReportKey, Arc<ComplianceReport>>,
}

impl Engine {
    pub fn new(
        config: HardgateConfig,
        provider: Arc<dyn SnapshotProvider>,
    ) -> Result<Self, EngineError> {
        HardgateConfig::validate(&config)?;
        let threads = config.engine.effective_worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hardgate-eval-{i}"))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
        let reports = Cache::builder()
            .max_capacity(config.engine.effective_cache_capacity())
            .time_to_live(config.engine.effective_cache_ttl())
            .build();
        debug!(threads, "engine initialized");
        Ok(Self {
            config,
            registry: RegistryStore::default(),
            provider,
            sources: Vec::new(),
            pool,
            reports,
        })
    }

    pub fn with_registry(self, registry: GateRegistry) -> Self {
        self.registry.replace(registry);
        self
    }

    /// Register an evidence source. Registration order is report order.
    pub fn with_source(mut self, source: Arc<dyn EvidenceSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn config(&self) -> &HardgateConfig {
        &self.config
    }

    /// The registry new runs will use.
    pub fn registry(&self) -> Arc<GateRegistry> {
        self.registry.current()
    }

    /// Swap the registry between runs. Runs already in flight keep the
    /// registry they started with.
    pub fn reload_registry(&self, registry: GateRegistry) -> Arc<GateRegistry> {
        self.registry.replace(registry)
    }

    pub fn cached_reports(&self) -> u64 {
        self.reports.run_pending_tasks();
        self.reports.entry_count()
    }

    pub fn clear_cache(&self) {
        self.reports.invalidate_all();
    }

    /// Acquire the snapshot, then evaluate it or join an identical run already
    /// in progress.
    pub fn run(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<Arc<ComplianceReport>, EngineError> {
        let snapshot = self.provider.get_snapshot(&request.reference)?;
        let registry = self.registry.current();
        registry.check_selection(&request.gates)?;
        let key = ReportKey {
            fingerprint: snapshot.fingerprint().to_string(),
            registry_version: registry.version().to_string(),
            app_id: request.app_id.clone(),
            range: request.time_range,
            depth: self.depth_for(request),
            gates: request.gates.clone(),
            sources: request.sources.clone(),
        };
        loop {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let shared = self.reports.try_get_with(key.clone(), || {
                self.compute(&snapshot, &registry, request, cancel)
                    .map(Arc::new)
            });
            match shared {
                Ok(_) if cancel.is_cancelled() => return Err(EngineError::Cancelled),
                Ok(report) => return Ok(report),
                Err(e) if matches!(*e, EngineError::Cancelled) && !cancel.is_cancelled() => {
                    debug!(
                        fingerprint = %key.fingerprint,
                        "shared run was cancelled by another caller, computing again"
                    );
                }
                Err(e) => return Err((*e).clone()),
            }
        }
    }

    fn depth_for(&self, request: &RunRequest) -> ScanDepth {
        request
            .scan_depth
            .unwrap_or_else(|| self.config.scan.effective_depth())
    }

    /// Registered sources named by the request, in registration order.
    fn selected_sources(&self, request: &RunRequest) -> Vec<Arc<dyn EvidenceSource>> {
        for id in request.sources.ids() {
            if !self.sources.iter().any(|s| s.id() == id) {
                warn!(source = id, "requested evidence source is not registered");
            }
        }
        self.sources
            .iter()
            .filter(|s| request.sources.includes(s.id()))
            .cloned()
            .collect()
    }

    fn compute(
        &self,
        snapshot: &Snapshot,
        registry: &GateRegistry,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<ComplianceReport, EngineError> {
        let ctx = RunContext::new(&self.config, request.evaluated_at)
            .with_cancel(cancel.clone())
            .with_depth(self.depth_for(request))
            .with_gates(request.gates.clone());
        let profile = TechnologyDetector::new().detect(snapshot.files())?;

        let pending = EvidenceCollector::new(&self.config.evidence).start(
            &self.selected_sources(request),
            &request.app_id,
            request.time_range,
        );
        let evaluator = ctx.pattern_evaluator();
        let results = self
            .pool
            .install(|| evaluator.evaluate_all(registry, &profile, snapshot, cancel))?;
        let evidence = pending.join(cancel)?;

        assemble(snapshot.fingerprint(), registry, results, &evidence, &ctx)
    }
}
