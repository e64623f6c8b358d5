//! Histogram-based technology detector.

use std::collections::{BTreeMap, BTreeSet};

use hardgate_core::errors::DetectionError;
use tracing::debug;

use super::tables;
use super::types::{LabelKind, Technology, TechnologyProfile};
use crate::scanner::{FileRecord, Language};

/// Infers a `TechnologyProfile` from a file inventory.
///
/// Language and framework confidence is the share of readable (non-binary)
/// files supporting the label, capped at 1.0. Platforms are presence-based.
#[derive(Debug, Default, Clone, Copy)]
pub struct TechnologyDetector;

impl TechnologyDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, files: &[FileRecord]) -> Result<TechnologyProfile, DetectionError> {
        if files.is_empty() {
            return Err(DetectionError::EmptyInventory);
        }
        let readable: Vec<&FileRecord> = files.iter().filter(|f| !f.binary).collect();
        if readable.is_empty() {
            return Err(DetectionError::NoReadableFiles { total: files.len() });
        }

        let mut languages: BTreeMap<Language, usize> = BTreeMap::new();
        let mut frameworks: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut platforms: BTreeMap<&'static str, usize> = BTreeMap::new();

        for file in &readable {
            if let Some(lang) = file.language {
                *languages.entry(lang).or_insert(0) += 1;
            }
            if let Some(framework) = tables::framework_for(file.file_name()) {
                *frameworks.entry(framework).or_insert(0) += 1;
            }
            if let Some(platform) = tables::platform_for(&file.path) {
                *platforms.entry(platform).or_insert(0) += 1;
            }
        }

        let deployment_files: usize = tables::DEPLOYMENT_PLATFORMS
            .iter()
            .filter_map(|p| platforms.get(p))
            .sum();
        if deployment_files > 0 {
            platforms.insert(tables::DEPLOYMENT, deployment_files);
        }

        let total = readable.len() as f64;
        let share = |count: usize| (count as f64 / total).min(1.0);

        let mut technologies = Vec::new();
        for (lang, count) in &languages {
            technologies.push(Technology {
                label: LabelKind::Language.label(lang.id()),
                kind: LabelKind::Language,
                confidence: share(*count),
                file_count: *count,
                programming: lang.is_programming(),
            });
        }
        for (name, count) in &frameworks {
            technologies.push(Technology {
                label: LabelKind::Framework.label(name),
                kind: LabelKind::Framework,
                confidence: share(*count),
                file_count: *count,
                programming: false,
            });
        }
        for (name, count) in &platforms {
            technologies.push(Technology {
                label: LabelKind::Platform.label(name),
                kind: LabelKind::Platform,
                confidence: 1.0,
                file_count: *count,
                programming: false,
            });
        }

        let profile = TechnologyProfile::new(technologies, files.len(), readable.len());
        debug!(
            labels = ?profile.labels().collect::<BTreeSet<_>>(),
            readable = profile.readable_files(),
            "technology profile detected"
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(path: &str, body: &[u8]) -> FileRecord {
        FileRecord::from_bytes(path, body)
    }

    #[test]
    fn languages_frameworks_platforms() {
        let files = vec![
            rec("pom.xml", b"<project/>"),
            rec("src/A.java", b"class A {}"),
            rec("src/B.java", b"class B {}"),
            rec("Dockerfile", b"FROM eclipse-temurin"),
            rec("k8s/deployment.yaml", b"kind: Deployment"),
        ];
        let profile = TechnologyDetector::new().detect(&files).unwrap();

        assert!((profile.confidence("language:java") - 0.4).abs() < 1e-9);
        assert!((profile.confidence("framework:maven") - 0.2).abs() < 1e-9);
        assert_eq!(profile.confidence("platform:container"), 1.0);
        assert_eq!(profile.confidence("platform:kubernetes"), 1.0);
        assert!(profile.has("platform:deployment"));
        assert!(profile.has_kind(LabelKind::Language));
    }

    #[test]
    fn binary_files_excluded_from_denominator() {
        let files = vec![rec("a.py", b"print(1)"), rec("logo.png", &[0, 1, 2])];
        let profile = TechnologyDetector::new().detect(&files).unwrap();
        assert_eq!(profile.confidence("language:python"), 1.0);
        assert_eq!(profile.total_files(), 2);
        assert_eq!(profile.readable_files(), 1);
    }

    #[test]
    fn no_deployment_without_manifests() {
        let files = vec![rec("Dockerfile", b"FROM node"), rec("index.js", b"1")];
        let profile = TechnologyDetector::new().detect(&files).unwrap();
        assert!(profile.has("platform:container"));
        assert!(!profile.has("platform:deployment"));
    }

    #[test]
    fn data_formats_alone_are_not_a_language() {
        let files = vec![rec("values.yaml", b"a: 1")];
        let profile = TechnologyDetector::new().detect(&files).unwrap();
        assert!(profile.has("language:yaml"));
        assert!(!profile.has_kind(LabelKind::Language));
    }

    #[test]
    fn programming_flag_follows_the_language() {
        let files = vec![
            rec("main.tf", b"resource {}"),
            rec("app.properties", b"a=1"),
            rec("lib.kt", b"fun a() {}"),
            rec("Gemfile.gemspec", b""),
        ];
        let profile = TechnologyDetector::new().detect(&files).unwrap();
        let flags: Vec<(&str, bool)> = profile
            .iter()
            .filter(|t| t.kind == LabelKind::Language)
            .map(|t| (t.label.as_str(), t.programming))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("language:hcl", false),
                ("language:kotlin", true),
                ("language:properties", false),
                ("language:ruby", true),
            ]
        );
        assert!(profile
            .iter()
            .filter(|t| t.kind != LabelKind::Language)
            .all(|t| !t.programming));
    }

    #[test]
    fn empty_and_unreadable_inventories_fail() {
        let detector = TechnologyDetector::new();
        assert!(matches!(
            detector.detect(&[]),
            Err(DetectionError::EmptyInventory)
        ));
        assert!(matches!(
            detector.detect(&[rec("x.bin", &[0])]),
            Err(DetectionError::NoReadableFiles { total: 1 })
        ));
    }

    #[test]
    fn detection_is_deterministic() {
        let files = vec![rec("a.ts", b"x"), rec("package.json", b"{}"), rec("b.go", b"y")];
        let detector = TechnologyDetector::new();
        assert_eq!(detector.detect(&files).unwrap(), detector.detect(&files).unwrap());
    }
}
