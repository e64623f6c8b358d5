//! Technology profile types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The namespace of a technology label (`language:`, `framework:`, `platform:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Language,
    Framework,
    Platform,
}

impl LabelKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Framework => "framework",
            Self::Platform => "platform",
        }
    }

    /// Build a namespaced label, e.g. `language:java`.
    pub fn label(&self, name: &str) -> String {
        format!("{}:{}", self.prefix(), name)
    }

    /// Parse the namespace of a label.
    pub fn of_label(label: &str) -> Option<Self> {
        match label.split_once(':')?.0 {
            "language" => Some(Self::Language),
            "framework" => Some(Self::Framework),
            "platform" => Some(Self::Platform),
            _ => None,
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One detected technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub label: String,
    pub kind: LabelKind,
    /// Share of readable files supporting this label, in [0, 1]. Platforms are
    /// presence-based and always 1.0.
    pub confidence: f64,
    pub file_count: usize,
    /// Set on language labels naming a programming language rather than a
    /// data or configuration format.
    #[serde(default)]
    pub programming: bool,
}

/// Technologies detected in one snapshot. Never mutated after detection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TechnologyProfile {
    technologies: BTreeMap<String, Technology>,
    total_files: usize,
    readable_files: usize,
}

impl TechnologyProfile {
    pub fn new(
        technologies: impl IntoIterator<Item = Technology>,
        total_files: usize,
        readable_files: usize,
    ) -> Self {
        Self {
            technologies: technologies
                .into_iter()
                .map(|t| (t.label.clone(), t))
                .collect(),
            total_files,
            readable_files,
        }
    }

    /// Confidence for a label, 0.0 when absent.
    pub fn confidence(&self, label: &str) -> f64 {
        self.technologies
            .get(label)
            .map(|t| t.confidence)
            .unwrap_or(0.0)
    }

    pub fn has(&self, label: &str) -> bool {
        self.technologies.contains_key(label)
    }

    /// Whether any label of the given kind was detected.
    ///
    /// For languages only programming languages count; a repository of pure
    /// YAML does not "have a language" for gating purposes.
    pub fn has_kind(&self, kind: LabelKind) -> bool {
        self.technologies
            .values()
            .any(|t| t.kind == kind && (kind != LabelKind::Language || t.programming))
    }

    pub fn get(&self, label: &str) -> Option<&Technology> {
        self.technologies.get(label)
    }

    /// Technologies in label order.
    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.technologies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn readable_files(&self) -> usize {
        self.readable_files
    }
}
