//! Hard-gate definitions, applicability predicates, and the registry.

pub mod builtin;
pub mod predicate;
pub mod registry;
pub mod types;

pub use predicate::Predicate;
pub use registry::{GateRegistry, RegistryStore};
pub use types::{
    EvaluatorKind, GateCategory, GateDefinition, GateId, GateResult, GateStatus, Pattern,
    PatternKind, PatternTarget, Polarity, Remediation, Severity, StatusThresholds,
};
