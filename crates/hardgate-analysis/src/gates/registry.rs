//! Versioned, ordered gate registry and its hot-reloadable store.

use std::sync::{Arc, RwLock};

use hardgate_core::errors::RegistryError;
use hardgate_core::types::collections::FxHashSet;
use hardgate_core::types::Selection;
use serde::Deserialize;
use tracing::info;

use super::builtin;
use super::predicate::Predicate;
use super::types::{
    EvaluatorKind, GateCategory, GateDefinition, Pattern, Polarity, Remediation, Severity,
};
use crate::detection::TechnologyProfile;

/// Ordered list of gate definitions plus a version string.
///
/// Gate order is the registry order and is preserved in every report.
#[derive(Debug, Clone, PartialEq)]
pub struct GateRegistry {
    version: String,
    gates: Vec<GateDefinition>,
}

impl GateRegistry {
    /// Build a registry, validating every definition.
    pub fn new(
        version: impl Into<String>,
        gates: Vec<GateDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut seen = FxHashSet::default();
        for gate in &gates {
            validate_gate(gate)?;
            if !seen.insert(gate.id.as_str()) {
                return Err(RegistryError::DuplicateGate(gate.id.clone()));
            }
        }
        Ok(Self {
            version: version.into(),
            gates,
        })
    }

    /// The built-in hard-gate catalog.
    pub fn builtin() -> Self {
        Self {
            version: builtin::BUILTIN_VERSION.to_string(),
            gates: builtin::gates(),
        }
    }

    /// Parse a registry document. `source_name` is used in error messages.
    pub fn from_toml_str(source_name: &str, text: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(text).map_err(|e| RegistryError::ParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        let gates = file
            .gates
            .into_iter()
            .map(GateSpec::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(file.version, gates)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn list_gates(&self) -> &[GateDefinition] {
        &self.gates
    }

    pub fn get(&self, id: &str) -> Option<&GateDefinition> {
        self.gates.iter().find(|g| g.id == id)
    }

    /// Gates whose applicability predicate holds for `profile`, in registry order.
    pub fn applicable_gates<'a>(&'a self, profile: &TechnologyProfile) -> Vec<&'a GateDefinition> {
        self.gates
            .iter()
            .filter(|g| g.applicability.evaluate(profile))
            .collect()
    }

    /// Reject a gate selection naming ids this registry does not define.
    pub fn check_selection(&self, selection: &Selection) -> Result<(), RegistryError> {
        match selection.ids().find(|id| self.get(id).is_none()) {
            Some(unknown) => Err(RegistryError::UnknownGate(unknown.to_string())),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

fn validate_gate(gate: &GateDefinition) -> Result<(), RegistryError> {
    let invalid = |message: &str| RegistryError::InvalidGate {
        gate_id: gate.id.clone(),
        message: message.to_string(),
    };
    if gate.id.trim().is_empty() {
        return Err(invalid("gate id must not be empty"));
    }
    if !(gate.weight.is_finite() && gate.weight > 0.0) {
        return Err(invalid("weight must be a positive number"));
    }
    if gate.patterns.is_empty() {
        return Err(invalid("gate must declare at least one pattern"));
    }
    let mut pattern_ids = FxHashSet::default();
    for pattern in &gate.patterns {
        if !pattern_ids.insert(pattern.id.as_str()) {
            return Err(invalid(&format!("duplicate pattern id {}", pattern.id)));
        }
        if let Some(w) = pattern.weight {
            if !(w.is_finite() && w > 0.0) {
                return Err(invalid(&format!(
                    "pattern {} weight must be positive",
                    pattern.id
                )));
            }
        }
        // An inverse gate starts at the cap, so a positive hit could never move it.
        if gate.evaluator == EvaluatorKind::Inverse && pattern.polarity == Polarity::Positive {
            return Err(invalid(&format!(
                "pattern {} is positive but the inverse evaluator only scores negative hits",
                pattern.id
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    version: String,
    #[serde(default)]
    gates: Vec<GateSpec>,
}

#[derive(Debug, Deserialize)]
struct GateSpec {
    id: String,
    name: String,
    category: GateCategory,
    #[serde(default)]
    applicability: Predicate,
    patterns: Vec<Pattern>,
    weight: f64,
    severity: Severity,
    #[serde(default = "default_evaluator")]
    evaluator: String,
    #[serde(default)]
    remediation: Remediation,
}

fn default_evaluator() -> String {
    "saturating".to_string()
}

impl GateSpec {
    fn resolve(self) -> Result<GateDefinition, RegistryError> {
        let evaluator =
            EvaluatorKind::resolve(&self.evaluator).ok_or_else(|| RegistryError::UnknownEvaluator {
                gate_id: self.id.clone(),
                evaluator: self.evaluator.clone(),
            })?;
        Ok(GateDefinition {
            id: self.id,
            name: self.name,
            category: self.category,
            applicability: self.applicability,
            patterns: self.patterns,
            weight: self.weight,
            severity: self.severity,
            evaluator,
            remediation: self.remediation,
        })
    }
}

/// Holds the active registry. Readers take an `Arc` snapshot, so a reload
/// never affects a run already in flight.
#[derive(Debug)]
pub struct RegistryStore {
    current: RwLock<Arc<GateRegistry>>,
}

impl RegistryStore {
    pub fn new(registry: GateRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// The registry to use for a new run.
    pub fn current(&self) -> Arc<GateRegistry> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a new registry, returning the previous one.
    pub fn replace(&self, registry: GateRegistry) -> Arc<GateRegistry> {
        let next = Arc::new(registry);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            from = previous.version(),
            to = guard.version(),
            gates = guard.len(),
            "gate registry reloaded"
        );
        previous
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new(GateRegistry::builtin())
    }
}
