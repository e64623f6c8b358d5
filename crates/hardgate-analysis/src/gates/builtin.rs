//! Built-in hard-gate catalog.

use super::predicate::Predicate;
use super::types::{
    EvaluatorKind, GateCategory, GateDefinition, Pattern, PatternKind, PatternTarget, Polarity,
    Remediation, Severity,
};
use crate::detection::LabelKind;

pub const BUILTIN_VERSION: &str = "hardgate-builtin/1.0.0";

fn regex(id: &str, description: &str, body: &str) -> Pattern {
    Pattern {
        id: id.to_string(),
        matcher: PatternKind::Regex(body.to_string()),
        polarity: Polarity::Positive,
        target: PatternTarget::Content,
        weight: None,
        description: description.to_string(),
    }
}

fn literal(id: &str, description: &str, body: &str) -> Pattern {
    Pattern {
        matcher: PatternKind::Literal(body.to_string()),
        ..regex(id, description, "")
    }
}

fn negative(mut pattern: Pattern) -> Pattern {
    pattern.polarity = Polarity::Negative;
    pattern
}

fn on_path(mut pattern: Pattern) -> Pattern {
    pattern.target = PatternTarget::Path;
    pattern
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct Gate {
    id: &'static str,
    name: &'static str,
    category: GateCategory,
    weight: f64,
    severity: Severity,
}

impl Gate {
    fn build(self, patterns: Vec<Pattern>, absent: &[&str], improve: &[&str]) -> GateDefinition {
        let mut absent = lines(absent);
        absent.push(format!(
            "Implement {} patterns",
            self.id.replace('_', " ").to_lowercase()
        ));
        GateDefinition {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            applicability: Predicate::AnyKind(LabelKind::Language),
            patterns,
            weight: self.weight,
            severity: self.severity,
            evaluator: EvaluatorKind::Saturating,
            remediation: Remediation {
                absent,
                improve: lines(improve),
            },
        }
    }
}

/// The catalog in registry order.
pub fn gates() -> Vec<GateDefinition> {
    vec![
        Gate {
            id: "STRUCTURED_LOGS",
            name: "Structured Logs",
            category: GateCategory::Logging,
            weight: 2.0,
            severity: Severity::High,
        }
        .build(
            vec![
                regex(
                    "logger-calls",
                    "Structured logging calls",
                    r"\b(logger|log|logging)\.(info|warn|warning|error|debug|trace)\s*\(",
                ),
                regex(
                    "logging-frameworks",
                    "Logging frameworks",
                    r"\b(log4j|logback|slf4j|winston|pino|bunyan|structlog|serilog|zerolog|logrus)\b",
                ),
                regex(
                    "json-logging",
                    "JSON logging",
                    r"JSON\.stringify|json\.dumps|JsonFormatter|LogstashEncoder",
                ),
            ],
            &[
                "Implement structured logging framework (log4j, winston, etc.)",
                "Use JSON format for log output",
                "Add log levels (INFO, WARN, ERROR, DEBUG)",
            ],
            &[
                "Ensure consistent logging patterns across all files",
                "Add correlation IDs to log entries",
            ],
        ),
        GateDefinition {
            evaluator: EvaluatorKind::Inverse,
            ..Gate {
                id: "AVOID_LOGGING_SECRETS",
                name: "Avoid Logging Secrets",
                category: GateCategory::Security,
                weight: 3.0,
                severity: Severity::Critical,
            }
            .build(
                vec![
                    negative(Pattern {
                        matcher: PatternKind::Window {
                            anchor: r"\b(logger|log|logging|console)\.(info|warn|warning|error|debug|trace|log)\b|\bprint(ln|f)?\s*\(|System\.out\.print".to_string(),
                            context: r"\b(password|passwd|pwd|secret|api[_-]?key|access[_-]?token|auth[_-]?token|credentials?)\b".to_string(),
                            lines: 0,
                        },
                        ..regex("secret-in-log", "Potential secret logging", "")
                    }),
                ],
                &[
                    "Remove or mask sensitive data from logs",
                    "Use environment variables for secrets",
                    "Implement log filtering for sensitive data",
                ],
                &[
                    "Remove or mask sensitive data from logs",
                    "Implement log filtering for sensitive data",
                ],
            )
        },
        Gate {
            id: "AUDIT_TRAIL",
            name: "Audit Trail",
            category: GateCategory::Logging,
            weight: 2.0,
            severity: Severity::High,
        }
        .build(
            vec![
                regex(
                    "audit",
                    "Audit trail implementation",
                    r"\baudit(_?log|_?trail|ing|ed)?\b|AuditEvent|@Audited",
                ),
                regex(
                    "user-actions",
                    "User action logging",
                    r"\b(user|admin)[_\s]?action|\baction[_\s]?log",
                ),
            ],
            &[
                "Record security-relevant user and admin actions in an audit log",
                "Include actor, action, target, and timestamp in each audit entry",
            ],
            &["Cover all privileged operations with audit entries"],
        ),
        Gate {
            id: "CORRELATION_ID",
            name: "Correlation ID",
            category: GateCategory::Logging,
            weight: 1.5,
            severity: Severity::Medium,
        }
        .build(
            vec![
                regex(
                    "correlation-id",
                    "Correlation ID implementation",
                    r"correlation[_-]?id|request[_-]?id|trace[_-]?id",
                ),
                regex(
                    "correlation-headers",
                    "Correlation ID headers",
                    r"X-(Correlation|Request)-ID|traceparent|MDC\.put",
                ),
            ],
            &[
                "Generate a correlation ID at the service edge",
                "Propagate the correlation ID through headers and log context",
            ],
            &["Attach the correlation ID to every log entry and outbound call"],
        ),
        Gate {
            id: "LOG_API_CALLS",
            name: "Log API Calls",
            category: GateCategory::Logging,
            weight: 1.0,
            severity: Severity::Medium,
        }
        .build(
            vec![
                regex(
                    "api-logging",
                    "API call logging",
                    r"\b(api|request|response)[_\s]?log(ger|ging)?\b|\blog[_\s]?(api|request|response)s?\b",
                ),
                regex(
                    "logging-middleware",
                    "Request logging middleware",
                    r"\binterceptor\b|middleware\w*log|morgan\(|HttpLoggingInterceptor|LoggingFilter",
                ),
            ],
            &[
                "Log inbound and outbound API calls with method, path, status, and latency",
                "Add request logging middleware",
            ],
            &["Log API calls consistently across all services"],
        ),
        GateDefinition {
            applicability: Predicate::any_of(["language:javascript", "language:typescript"]),
            ..Gate {
                id: "CLIENT_UI_ERRORS",
                name: "Client UI Errors",
                category: GateCategory::Monitoring,
                weight: 1.0,
                severity: Severity::Medium,
            }
            .build(
                vec![
                    regex(
                        "error-tracking",
                        "Error tracking implementation",
                        r"error[_\s]?(tracking|monitoring|boundary)|componentDidCatch|window\.onerror|unhandledrejection",
                    ),
                    regex(
                        "error-services",
                        "Error tracking services",
                        r"\b(sentry|rollbar|bugsnag)\b",
                    ),
                ],
                &[
                    "Capture client-side errors with an error tracking service",
                    "Add error boundaries around UI components",
                ],
                &["Report unhandled promise rejections as well as render errors"],
            )
        },
        Gate {
            id: "RETRY_LOGIC",
            name: "Retry Logic",
            category: GateCategory::Reliability,
            weight: 2.0,
            severity: Severity::High,
        }
        .build(
            vec![
                regex(
                    "retry",
                    "Retry logic implementation",
                    r"\bretr(y|ies|yable|ying)\b|retry[_\s]?policy",
                ),
                regex(
                    "retry-annotations",
                    "Retry annotations",
                    r"@Retryable|@Retry\b|\bbackoff\b|tenacity",
                ),
            ],
            &[
                "Retry transient failures of outbound calls",
                "Use exponential backoff with jitter",
            ],
            &["Bound retries and apply them to every remote dependency"],
        ),
        Gate {
            id: "TIMEOUT_IO",
            name: "Timeout on I/O",
            category: GateCategory::Reliability,
            weight: 2.0,
            severity: Severity::High,
        }
        .build(
            vec![
                regex(
                    "timeout",
                    "Timeout configuration",
                    r"\btimeout\b|(connect|read|socket|request)[_\s]?timeout",
                ),
                regex(
                    "timeout-annotations",
                    "Timeout annotations",
                    r"@Timeout|@TimeLimiter|timeout[_\s]?ms|WithTimeout",
                ),
                negative(regex(
                    "timeout-disabled",
                    "Disabled timeout",
                    r"timeout\s*[=:]\s*(0|None|null|-1)\b",
                )),
            ],
            &[
                "Set explicit connect and read timeouts on all I/O",
                "Make timeouts configurable per dependency",
            ],
            &["Remove disabled or unbounded timeouts"],
        ),
        Gate {
            id: "THROTTLING",
            name: "Throttling",
            category: GateCategory::Reliability,
            weight: 1.5,
            severity: Severity::Medium,
        }
        .build(
            vec![
                regex(
                    "throttling",
                    "Throttling implementation",
                    r"\bthrottl\w*|rate[_\s-]?limit",
                ),
                regex(
                    "rate-limit-annotations",
                    "Rate limiting annotations",
                    r"@RateLimit|RateLimiter|token[_\s]?bucket|bucket4j",
                ),
            ],
            &[
                "Apply rate limiting to public endpoints",
                "Return 429 with Retry-After when throttling",
            ],
            &["Tune rate limits per client and endpoint"],
        ),
        Gate {
            id: "CIRCUIT_BREAKERS",
            name: "Circuit Breakers",
            category: GateCategory::Reliability,
            weight: 2.0,
            severity: Severity::High,
        }
        .build(
            vec![
                regex(
                    "circuit-breaker",
                    "Circuit breaker implementation",
                    r"circuit[_\s-]?breaker",
                ),
                regex(
                    "circuit-breaker-libraries",
                    "Circuit breaker libraries",
                    r"\b(Hystrix|Resilience4j|Polly|opossum|pybreaker|gobreaker)\b",
                ),
            ],
            &[
                "Wrap remote dependencies in circuit breakers",
                "Provide fallbacks when a breaker is open",
            ],
            &["Expose circuit breaker state in metrics"],
        ),
        Gate {
            id: "HTTP_ERROR_CODES",
            name: "HTTP Error Codes",
            category: GateCategory::Reliability,
            weight: 1.0,
            severity: Severity::Medium,
        }
        .build(
            vec![
                regex(
                    "http-status",
                    "HTTP error handling",
                    r"\b(HTTP|status|status_?code)\W{0,3}[45]\d\d\b",
                ),
                regex(
                    "error-handlers",
                    "Error handling annotations",
                    r"@ResponseStatus|@ExceptionHandler|@ControllerAdvice|HttpException",
                ),
            ],
            &[
                "Map failures to meaningful 4xx and 5xx status codes",
                "Centralize error-to-status translation",
            ],
            &["Return consistent error bodies for all error statuses"],
        ),
        Gate {
            id: "URL_MONITORING",
            name: "URL Monitoring",
            category: GateCategory::Monitoring,
            weight: 1.5,
            severity: Severity::Medium,
        }
        .build(
            vec![
                regex(
                    "health-check",
                    "Health check endpoints",
                    r"health[_\s-]?check|health[_\s-]?endpoint",
                ),
                regex(
                    "health-routes",
                    "Health monitoring",
                    r"@HealthCheck|HealthIndicator|/(health|healthz|ping|readyz|livez)\b",
                ),
            ],
            &[
                "Expose a health check endpoint",
                "Register the endpoint with synthetic URL monitoring",
            ],
            &["Check downstream dependencies in readiness probes"],
        ),
        Gate {
            id: "AUTOMATED_TESTS",
            name: "Automated Tests",
            category: GateCategory::Testing,
            weight: 2.5,
            severity: Severity::High,
        }
        .build(
            vec![
                on_path(regex(
                    "test-files",
                    "Test files",
                    r"(^|/)(tests?|spec|__tests__)/|[._-](test|spec)\.[a-z]+$|(^|/)test_[^/]+$|Tests?\.(java|kt|cs)$",
                )),
                regex(
                    "test-annotations",
                    "Test annotations",
                    r"@Test\b|\bdescribe\(|\bit\(|\btest\(|\bpytest\b|#\[test\]|\bfunc Test\w*\(",
                ),
            ],
            &[
                "Add unit tests for all components",
                "Implement integration tests",
                "Add test coverage reporting",
            ],
            &[
                "Increase test coverage to at least 80%",
                "Add performance and security tests",
            ],
        ),
        GateDefinition {
            applicability: Predicate::has("platform:deployment"),
            ..Gate {
                id: "AUTO_SCALE",
                name: "Auto Scale",
                category: GateCategory::Scalability,
                weight: 1.5,
                severity: Severity::Medium,
            }
            .build(
                vec![
                    regex(
                        "autoscale",
                        "Auto-scaling configuration",
                        r"auto[_\s-]?scal\w*|scaling[_\s]?polic\w*",
                    ),
                    regex(
                        "kubernetes-hpa",
                        "Kubernetes auto-scaling",
                        r"HorizontalPodAutoscaler|\bHPA\b|\b(min|max)Replicas\b",
                    ),
                ],
                &[
                    "Implement Kubernetes Horizontal Pod Autoscaler (HPA)",
                    "Configure auto-scaling policies",
                    "Add resource monitoring and alerts",
                ],
                &[
                    "Optimize auto-scaling thresholds",
                    "Add custom metrics for scaling decisions",
                ],
            )
        },
        Gate {
            id: "ALERTING_ACTIONABLE",
            name: "Actionable Alerting",
            category: GateCategory::Monitoring,
            weight: 1.5,
            severity: Severity::High,
        }
        .build(
            vec![
                regex(
                    "alerting",
                    "Alerting implementation",
                    r"\balert(s|ing|manager)?\b|\bnotification\b",
                ),
                literal("pagerduty", "Alerting services", "pagerduty"),
                regex(
                    "alert-channels",
                    "Alerting services",
                    r"opsgenie|slack[_\s]?webhook|email[_\s]?alert|PrometheusRule",
                ),
            ],
            &[
                "Define alerts for error rate, latency, and saturation",
                "Route alerts to an on-call channel",
            ],
            &["Attach a runbook link to every alert"],
        ),
    ]
}
