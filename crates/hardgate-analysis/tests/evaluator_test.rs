//! Pattern evaluation through the public entry point: scoring scenarios,
//! threshold boundaries, negative evidence, and error isolation.

use chrono::{TimeZone, Utc};
use hardgate_analysis::evidence::EvidenceSet;
use hardgate_analysis::gates::{GateRegistry, GateStatus};
use hardgate_analysis::scanner::Snapshot;
use hardgate_analysis::{evaluate, ComplianceReport, RunContext};
use hardgate_core::config::{HardgateConfig, ScanDepth};

fn run(snapshot: &Snapshot, registry: &GateRegistry) -> ComplianceReport {
    let config = HardgateConfig::default();
    let ctx = RunContext::new(&config, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    evaluate(snapshot, registry, &EvidenceSet::new(), &ctx).unwrap()
}

/// One gate, one regex pattern with an explicit per-hit weight.
fn single_gate_registry(weight: f64) -> GateRegistry {
    GateRegistry::from_toml_str(
        "boundary.toml",
        &format!(
            r#"
version = "boundary-1"

[[gates]]
id = "BOUNDARY"
name = "Boundary"
category = "reliability"
weight = 1.0
severity = "medium"

[[gates.patterns]]
id = "marker"
weight = {weight:.1}
matcher = {{ literal = "hardgate-marker" }}
"#
        ),
    )
    .unwrap()
}

#[test]
fn test_structured_logs_zero_without_log_statements() {
    let snapshot = Snapshot::from_sources([
        ("src/calc.py", "def add(a, b):\n    return a + b\n"),
        ("src/util.py", "def mul(a, b):\n    return a * b\n"),
    ])
    .unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    let gate = report.gate("STRUCTURED_LOGS").unwrap();
    assert_eq!(gate.score, 0.0);
    assert_eq!(gate.status, GateStatus::Fail);
    assert!(gate.evidence.is_empty());
}

#[test]
fn test_retry_logic_five_files_reaches_pass() {
    let sources: Vec<(String, String)> = (0..5)
        .map(|i| {
            (
                format!("svc/client_{i}.py"),
                format!("def call_{i}():\n    return client.retry(3)\n"),
            )
        })
        .collect();
    let snapshot = Snapshot::from_sources(sources).unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    let gate = report.gate("RETRY_LOGIC").unwrap();
    assert_eq!(gate.evidence.len(), 5);
    assert_eq!(gate.score, 100.0);
    assert_eq!(gate.status, GateStatus::Pass);
}

#[test]
fn test_redundant_hits_saturate_below_cap() {
    // Three hits in one file: 20 + 10 + 5.
    let snapshot = Snapshot::from_sources([(
        "svc/client.py",
        "client.retry(1)\nclient.retry(2)\nclient.retry(3)\n",
    )])
    .unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    assert_eq!(report.gate("RETRY_LOGIC").unwrap().score, 35.0);
}

#[test]
fn test_status_threshold_boundaries() {
    let snapshot = Snapshot::from_sources([("app.py", "# hardgate-marker\n")]).unwrap();
    for (weight, expected) in [
        (80.0, GateStatus::Pass),
        (79.0, GateStatus::Partial),
        (40.0, GateStatus::Partial),
        (39.0, GateStatus::Fail),
    ] {
        let report = run(&snapshot, &single_gate_registry(weight));
        let gate = report.gate("BOUNDARY").unwrap();
        assert_eq!(gate.score, weight);
        assert_eq!(gate.status, expected, "score {weight}");
    }
}

#[test]
fn test_secret_logging_lowers_inverse_gate() {
    let snapshot = Snapshot::from_sources([(
        "auth/login.py",
        "def login(user, password):\n    logger.info(\"login %s password=%s\", user, password)\n",
    )])
    .unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    let gate = report.gate("AVOID_LOGGING_SECRETS").unwrap();
    assert_eq!(gate.score, 75.0);
    assert_eq!(gate.status, GateStatus::Partial);
    assert_eq!(gate.evidence[0].reference, "auth/login.py:2");
}

#[test]
fn test_clean_code_keeps_inverse_gate_at_full_score() {
    let snapshot = Snapshot::from_sources([("app.py", "print('hello')\n")]).unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    assert_eq!(report.gate("AVOID_LOGGING_SECRETS").unwrap().score, 100.0);
}

#[test]
fn test_negative_evidence_wins_on_same_line() {
    let registry = GateRegistry::from_toml_str(
        "polarity.toml",
        r#"
version = "polarity-1"

[[gates]]
id = "LOGGING"
name = "Logging"
category = "logging"
weight = 1.0
severity = "high"

[[gates.patterns]]
id = "logger-call"
matcher = { regex = "logger\\.info" }

[[gates.patterns]]
id = "secret-in-log"
polarity = "negative"
matcher = { window = { anchor = "logger\\.info", context = "token", lines = 0 } }
"#,
    )
    .unwrap();
    let snapshot = Snapshot::from_sources([(
        "app.py",
        "logger.info('token=%s', token)\nlogger.info('started')\n",
    )])
    .unwrap();
    let report = run(&snapshot, &registry);
    let gate = report.gate("LOGGING").unwrap();
    // Line 1: positive suppressed, negative 25. Line 2: positive 20.
    assert_eq!(gate.score, 0.0);
    let mut refs: Vec<&str> = gate.evidence.iter().map(|e| e.reference.as_str()).collect();
    refs.sort_unstable();
    assert_eq!(refs, vec!["app.py:1", "app.py:2"]);
    let line_one = gate
        .evidence
        .iter()
        .find(|e| e.reference == "app.py:1")
        .unwrap();
    assert_eq!(line_one.pattern_id.as_deref(), Some("secret-in-log"));
}

#[test]
fn test_malformed_pattern_is_isolated() {
    let good = r#"
[[gates]]
id = "RETRIES"
name = "Retries"
category = "reliability"
weight = 1.0
severity = "high"

[[gates.patterns]]
id = "retry"
matcher = { regex = "retry" }
"#;
    let bad = r#"
[[gates]]
id = "BROKEN"
name = "Broken"
category = "reliability"
weight = 5.0
severity = "critical"

[[gates.patterns]]
id = "unclosed"
matcher = { regex = "(retry" }
"#;
    let with_bad = GateRegistry::from_toml_str(
        "mixed.toml",
        &format!("version = \"v1\"\n{good}{bad}"),
    )
    .unwrap();
    let only_good =
        GateRegistry::from_toml_str("good.toml", &format!("version = \"v1\"\n{good}")).unwrap();

    let snapshot = Snapshot::from_sources([("a.py", "client.retry()\n")]).unwrap();
    let mixed = run(&snapshot, &with_bad);
    let clean = run(&snapshot, &only_good);

    let broken = mixed.gate("BROKEN").unwrap();
    assert_eq!(broken.status, GateStatus::Error);
    assert!(broken.error.as_deref().unwrap().contains("unclosed"));
    assert_eq!(mixed.gate("RETRIES"), clean.gate("RETRIES"));
    assert_eq!(
        mixed.executive_summary.overall_score,
        clean.executive_summary.overall_score
    );
    assert_eq!(mixed.executive_summary.errored, 1);
    assert!(mixed.recommendations.iter().any(|r| r.gate_id == "BROKEN"));
}

#[test]
fn test_automated_tests_detected_from_paths() {
    let snapshot = Snapshot::from_sources([
        ("src/app.py", "def main():\n    pass\n"),
        ("tests/test_app.py", "import pytest\n"),
    ])
    .unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    let gate = report.gate("AUTOMATED_TESTS").unwrap();
    assert!(gate
        .evidence
        .iter()
        .any(|e| e.reference == "tests/test_app.py:0"));
    assert!(gate.score >= 40.0);
}

#[test]
fn test_documentation_mentions_do_not_count_by_default() {
    let snapshot = Snapshot::from_sources([
        ("app.py", "print('hello')\n"),
        ("README.md", "Requests retry three times.\n"),
        ("docs/a.md", "retry policy\n"),
        ("docs/b.md", "retry budget\n"),
        ("docs/c.txt", "retry\n"),
        ("docs/d.txt", "retry\n"),
    ])
    .unwrap();
    let report = run(&snapshot, &GateRegistry::builtin());
    let retry = report.gate("RETRY_LOGIC").unwrap();
    assert_eq!(retry.score, 0.0);
    assert_eq!(retry.status, GateStatus::Fail);
    assert!(retry.evidence.is_empty());

    let config = HardgateConfig::default();
    let ctx = RunContext::new(&config, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
        .with_depth(ScanDepth::Deep);
    let deep = evaluate(&snapshot, &GateRegistry::builtin(), &EvidenceSet::new(), &ctx).unwrap();
    assert!(deep.gate("RETRY_LOGIC").unwrap().score > 0.0);
}

#[test]
fn test_basic_depth_skips_configuration_files() {
    let snapshot = Snapshot::from_sources([
        ("app.py", "print('hello')\n"),
        ("config/http.yaml", "client:\n  retry: 3\n"),
    ])
    .unwrap();
    let config = HardgateConfig::default();
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let registry = GateRegistry::builtin();

    let comprehensive = run(&snapshot, &registry);
    assert!(comprehensive.gate("RETRY_LOGIC").unwrap().score > 0.0);

    let ctx = RunContext::new(&config, at).with_depth(ScanDepth::Basic);
    let basic = evaluate(&snapshot, &registry, &EvidenceSet::new(), &ctx).unwrap();
    assert_eq!(basic.gate("RETRY_LOGIC").unwrap().score, 0.0);
}
