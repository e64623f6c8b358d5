//! End-to-end runs: determinism, on-disk snapshots, slow and failing evidence
//! sources, cancellation, compute-once caching, and registry hot reload.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use hardgate_analysis::evidence::{
    EvidenceItem, EvidenceSet, EvidenceSource, SourceEvidence, SourceFetch, StaticEvidenceSource,
    TimeRange,
};
use hardgate_analysis::gates::{GateRegistry, GateStatus, Polarity};
use hardgate_analysis::report::json;
use hardgate_analysis::scanner::{DirectorySnapshotProvider, Snapshot, SnapshotProvider};
use hardgate_analysis::{evaluate, Engine, RunContext, RunRequest};
use hardgate_core::config::{HardgateConfig, ScanConfig, ScanDepth};
use hardgate_core::errors::{EngineError, EvidenceSourceError, RegistryError};
use hardgate_core::traits::{Cancellable, CancellationToken};
use hardgate_core::types::Selection;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn service_dir() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        dir.path(),
        "svc/client.py",
        "import logging\nlogger = logging.getLogger(__name__)\n\ndef fetch(session):\n    logger.info(\"fetch\")\n    return session.get(url, timeout=5)\n",
    );
    write(dir.path(), "svc/retry.py", "@retry(stop=3)\ndef call():\n    pass\n");
    write(dir.path(), "tests/test_client.py", "import pytest\n\ndef test_fetch():\n    pass\n");
    dir
}

fn request(dir: &tempfile::TempDir) -> RunRequest {
    RunRequest::new(
        dir.path().to_str().unwrap(),
        "billing",
        TimeRange::lookback("7d", at()).unwrap(),
        at(),
    )
}

fn config() -> HardgateConfig {
    let mut config = HardgateConfig::default();
    config.engine.worker_threads = Some(2);
    config
}

fn engine(config: HardgateConfig) -> Engine {
    Engine::new(
        config,
        Arc::new(DirectorySnapshotProvider::new(ScanConfig::default())),
    )
    .unwrap()
}

fn log_item(excerpt: &str) -> EvidenceItem {
    EvidenceItem::external(
        "logs",
        "RETRY_LOGIC",
        at() - chrono::TimeDelta::try_hours(1).unwrap(),
        1.0,
        Polarity::Positive,
        excerpt,
        "logs://billing",
    )
}

/// Counts fetches and holds each one open for a while.
struct CountingSource {
    fetches: Arc<AtomicUsize>,
    hold: Duration,
}

impl EvidenceSource for CountingSource {
    fn id(&self) -> &str {
        "counting"
    }

    fn fetch(&self, _app_id: &str, _range: &TimeRange) -> Result<SourceFetch, EvidenceSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.hold);
        Ok(SourceFetch::complete(Vec::new()))
    }
}

#[test]
fn test_evaluate_is_deterministic() {
    let snapshot = Snapshot::from_sources([
        ("b/service.py", "logger.info('retry %s', n)\nclient.retry()\n"),
        ("a/handler.py", "raise HttpException(status=503)\n"),
        ("Dockerfile", "FROM python:3.12\n"),
    ])
    .unwrap();
    let config = HardgateConfig::default();
    let ctx = RunContext::new(&config, at());
    let evidence: EvidenceSet = [SourceEvidence::ok("logs", vec![log_item("retry succeeded")])]
        .into_iter()
        .collect();

    let first = evaluate(&snapshot, &GateRegistry::builtin(), &evidence, &ctx).unwrap();
    let second = evaluate(&snapshot, &GateRegistry::builtin(), &evidence, &ctx).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        json::render(&first, true).unwrap(),
        json::render(&second, true).unwrap()
    );

    let ids: Vec<&str> = first.gates.iter().map(|g| g.id.as_str()).collect();
    let registry = GateRegistry::builtin();
    let expected: Vec<&str> = registry.list_gates().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_report_json_shape() {
    let snapshot = Snapshot::from_sources([("app.py", "print('hi')\n")]).unwrap();
    let config = HardgateConfig::default();
    let report = evaluate(
        &snapshot,
        &GateRegistry::builtin(),
        &EvidenceSet::new(),
        &RunContext::new(&config, at()),
    )
    .unwrap();
    let text = json::render(&report, false).unwrap();
    assert!(text.contains("\"executiveSummary\""));
    assert!(text.contains("\"gateComplianceRate\""));
    assert!(text.contains("\"NOT_APPLICABLE\""));
    assert!(text.contains("\"degradedSources\":[]"));
    assert_eq!(json::parse(&text).unwrap(), report);
}

#[test]
fn test_engine_matches_direct_evaluation() {
    let dir = service_dir();
    let engine = engine(config());
    let report = engine.run(&request(&dir), &CancellationToken::new()).unwrap();

    let snapshot = DirectorySnapshotProvider::new(ScanConfig::default())
        .get_snapshot(&request(&dir).reference)
        .unwrap();
    let config = config();
    let direct = evaluate(
        &snapshot,
        &GateRegistry::builtin(),
        &EvidenceSet::new(),
        &RunContext::new(&config, at()),
    )
    .unwrap();
    assert_eq!(*report, direct);
    assert_eq!(report.metadata.snapshot_fingerprint, snapshot.fingerprint());
    assert!(report.gate("AUTOMATED_TESTS").unwrap().score >= 40.0);
}

#[test]
fn test_slow_source_is_degraded_and_others_still_count() {
    let dir = service_dir();
    let mut config = config();
    config.evidence.source_timeouts.insert("apm".to_string(), 30);
    let engine = engine(config)
        .with_source(Arc::new(StaticEvidenceSource::new(
            "logs",
            vec![log_item("retry attempt succeeded")],
        )))
        .with_source(Arc::new(
            StaticEvidenceSource::new("apm", vec![]).with_delay(Duration::from_millis(500)),
        ));

    let started = Instant::now();
    let report = engine.run(&request(&dir), &CancellationToken::new()).unwrap();
    assert!(started.elapsed() < Duration::from_millis(450));

    assert_eq!(report.degraded_sources, vec!["apm".to_string()]);
    let retry = report.gate("RETRY_LOGIC").unwrap();
    assert!(retry.evidence.iter().any(|e| e.source_id == "logs"));
    assert!(retry.confidence < 1.0);
    assert_eq!(retry.degraded_sources, vec!["apm".to_string()]);
    assert_eq!(report.evidence_summary.by_source.get("apm"), Some(&0));
}

#[test]
fn test_failing_source_does_not_fail_the_run() {
    let dir = service_dir();
    let engine = engine(config()).with_source(Arc::new(
        StaticEvidenceSource::new("portal", vec![])
            .failing("503 from portal")
            .covering(vec!["URL_MONITORING".to_string()]),
    ));
    let report = engine.run(&request(&dir), &CancellationToken::new()).unwrap();
    assert_eq!(report.degraded_sources, vec!["portal".to_string()]);
    assert!(report.gate("URL_MONITORING").unwrap().confidence < 1.0);
    assert_eq!(report.gate("RETRY_LOGIC").unwrap().confidence, 1.0);
}

#[test]
fn test_cancelled_run_returns_no_report() {
    let dir = service_dir();
    let engine = engine(config());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = engine.run(&request(&dir), &cancel).unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
    assert_eq!(engine.cached_reports(), 0, "failed runs are not cached");
}

#[test]
fn test_cancellation_interrupts_evidence_wait() {
    let dir = service_dir();
    let mut config = config();
    config.evidence.source_timeout_ms = Some(10_000);
    let engine = engine(config).with_source(Arc::new(
        StaticEvidenceSource::new("slow", vec![]).with_delay(Duration::from_secs(3)),
    ));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        trigger.cancel();
    });

    let started = Instant::now();
    let err = engine.run(&request(&dir), &cancel).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err, EngineError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_missing_reference_is_acquisition_error() {
    let engine = engine(config());
    let req = RunRequest::new(
        "/no/such/codebase",
        "billing",
        TimeRange::lookback("1d", at()).unwrap(),
        at(),
    );
    let err = engine.run(&req, &CancellationToken::new()).unwrap_err();
    assert_eq!(err.stage(), "acquisition");
}

#[test]
fn test_concurrent_identical_runs_compute_once() {
    let dir = service_dir();
    let fetches = Arc::new(AtomicUsize::new(0));
    let engine = engine(config()).with_source(Arc::new(CountingSource {
        fetches: Arc::clone(&fetches),
        hold: Duration::from_millis(100),
    }));
    let req = request(&dir);

    let reports: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.run(&req, &CancellationToken::new()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(reports.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));

    let again = engine.run(&req, &CancellationToken::new()).unwrap();
    assert!(Arc::ptr_eq(&again, &reports[0]));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(engine.cached_reports(), 1);
}

#[test]
fn test_registry_reload_applies_to_next_run() {
    let dir = service_dir();
    let engine = engine(config());
    let req = request(&dir);
    let before = engine.run(&req, &CancellationToken::new()).unwrap();
    assert_eq!(before.metadata.registry_version, "hardgate-builtin/1.0.0");

    let custom = GateRegistry::from_toml_str(
        "custom.toml",
        r#"
version = "custom-2"

[[gates]]
id = "RETRY_LOGIC"
name = "Retry Logic"
category = "reliability"
weight = 1.0
severity = "high"

[[gates.patterns]]
id = "retry-decorator"
weight = 90.0
matcher = { literal = "@retry" }
"#,
    )
    .unwrap();
    let previous = engine.reload_registry(custom);
    assert_eq!(previous.version(), "hardgate-builtin/1.0.0");

    let after = engine.run(&req, &CancellationToken::new()).unwrap();
    assert_eq!(after.metadata.registry_version, "custom-2");
    assert_eq!(after.gates.len(), 1);
    assert_eq!(after.gates[0].status, GateStatus::Pass);
    // The earlier report is untouched and still cached under its own key.
    assert_eq!(before.gates.len(), 15);
    assert_eq!(engine.cached_reports(), 2);
}

#[test]
fn test_changed_codebase_is_not_served_from_cache() {
    let dir = service_dir();
    let engine = engine(config());
    let req = request(&dir);
    let first = engine.run(&req, &CancellationToken::new()).unwrap();
    write(dir.path(), "svc/breaker.py", "breaker = CircuitBreaker(fail_max=5)\n");
    let second = engine.run(&req, &CancellationToken::new()).unwrap();
    assert_ne!(
        first.metadata.snapshot_fingerprint,
        second.metadata.snapshot_fingerprint
    );
    assert!(second.gate("CIRCUIT_BREAKERS").unwrap().score > 0.0);
}

#[test]
fn test_cancelling_one_caller_leaves_joined_caller_running() {
    let dir = service_dir();
    let fetches = Arc::new(AtomicUsize::new(0));
    let engine = engine(config()).with_source(Arc::new(CountingSource {
        fetches: Arc::clone(&fetches),
        hold: Duration::from_millis(800),
    }));
    let req = request(&dir);
    let first_token = CancellationToken::new();

    let (first, second) = thread::scope(|scope| {
        let first = scope.spawn(|| engine.run(&req, &first_token));
        let second = scope.spawn(|| {
            thread::sleep(Duration::from_millis(150));
            engine.run(&req, &CancellationToken::new())
        });
        thread::sleep(Duration::from_millis(300));
        first_token.cancel();
        (first.join().unwrap(), second.join().unwrap())
    });

    assert!(matches!(first, Err(EngineError::Cancelled)));
    let report = second.expect("a caller that never cancelled gets a report");
    assert_eq!(report.gates.len(), 15);
    assert_eq!(engine.cached_reports(), 1);
    assert!(fetches.load(Ordering::SeqCst) >= 2);
}

#[test]
fn test_gate_selection_limits_scored_gates() {
    let dir = service_dir();
    let engine = engine(config());
    let full = engine.run(&request(&dir), &CancellationToken::new()).unwrap();
    let req = request(&dir).with_gates(Selection::only(["RETRY_LOGIC", "TIMEOUT_IO"]));
    let subset = engine.run(&req, &CancellationToken::new()).unwrap();

    assert_eq!(subset.gates.len(), 15);
    for gate in &subset.gates {
        if gate.id == "RETRY_LOGIC" || gate.id == "TIMEOUT_IO" {
            assert_eq!(gate.score, full.gate(&gate.id).unwrap().score);
        } else {
            assert_eq!(gate.status, GateStatus::NotApplicable, "{}", gate.id);
        }
    }
    let summary = &subset.executive_summary;
    assert_eq!(summary.passed + summary.partial + summary.failed, 2);
    assert!(subset
        .recommendations
        .iter()
        .all(|r| r.gate_id == "RETRY_LOGIC" || r.gate_id == "TIMEOUT_IO"));
    assert_eq!(engine.cached_reports(), 2);
}

#[test]
fn test_unknown_gate_selection_is_rejected() {
    let dir = service_dir();
    let engine = engine(config());
    let req = request(&dir).with_gates(Selection::only(["RETRY"]));
    let err = engine.run(&req, &CancellationToken::new()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Registry(RegistryError::UnknownGate(ref id)) if id == "RETRY"
    ));
    assert_eq!(err.stage(), "registry");
}

#[test]
fn test_source_selection_skips_unselected_sources() {
    let dir = service_dir();
    let fetches = Arc::new(AtomicUsize::new(0));
    let engine = engine(config())
        .with_source(Arc::new(CountingSource {
            fetches: Arc::clone(&fetches),
            hold: Duration::from_millis(10),
        }))
        .with_source(Arc::new(StaticEvidenceSource::new(
            "logs",
            vec![log_item("retry attempt succeeded")],
        )));
    let req = request(&dir).with_sources(Selection::only(["logs", "splunk"]));
    let report = engine.run(&req, &CancellationToken::new()).unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 0);
    let sources: Vec<&str> = report
        .evidence_summary
        .by_source
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(sources, vec!["logs"]);
    assert!(report.degraded_sources.is_empty());
}

#[test]
fn test_scan_depth_decides_whether_docs_count() {
    let dir = service_dir();
    write(
        dir.path(),
        "docs/runbook.md",
        "The payment client wraps calls in a circuit breaker.\n",
    );
    let engine = engine(config());
    let default = engine.run(&request(&dir), &CancellationToken::new()).unwrap();
    assert_eq!(default.gate("CIRCUIT_BREAKERS").unwrap().score, 0.0);

    let deep = engine
        .run(
            &request(&dir).with_scan_depth(ScanDepth::Deep),
            &CancellationToken::new(),
        )
        .unwrap();
    let breakers = deep.gate("CIRCUIT_BREAKERS").unwrap();
    assert!(breakers.score > 0.0);
    assert!(breakers
        .evidence
        .iter()
        .all(|e| e.reference.starts_with("docs/runbook.md:")));
    assert_eq!(engine.cached_reports(), 2);
}
