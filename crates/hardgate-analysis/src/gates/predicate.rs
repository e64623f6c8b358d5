//! Applicability predicates over a technology profile.

use serde::{Deserialize, Serialize};

use crate::detection::{LabelKind, TechnologyProfile};

/// Boolean rule deciding whether a gate applies to a snapshot.
///
/// In TOML: `"always"`, `{ has = "platform:kubernetes" }`,
/// `{ at_least = { label = "language:java", confidence = 0.1 } }`,
/// `{ any_kind = "language" }`, `{ all = [...] }`, `{ any = [...] }`,
/// `{ not = {...} }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    #[default]
    Always,
    Has(String),
    AtLeast { label: String, confidence: f64 },
    AnyKind(LabelKind),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn has(label: impl Into<String>) -> Self {
        Self::Has(label.into())
    }

    pub fn any_of<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Any(labels.into_iter().map(|l| Self::Has(l.into())).collect())
    }

    pub fn evaluate(&self, profile: &TechnologyProfile) -> bool {
        match self {
            Self::Always => true,
            Self::Has(label) => profile.has(label),
            Self::AtLeast { label, confidence } => profile.confidence(label) >= *confidence,
            Self::AnyKind(kind) => profile.has_kind(*kind),
            Self::All(terms) => terms.iter().all(|t| t.evaluate(profile)),
            Self::Any(terms) => terms.iter().any(|t| t.evaluate(profile)),
            Self::Not(inner) => !inner.evaluate(profile),
        }
    }
}
