//! Inventory scan configuration.

use serde::{Deserialize, Serialize};

/// Which files pattern evaluation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDepth {
    /// Source code in programming languages only.
    Basic,
    /// Source code plus configuration formats (JSON, YAML, TOML, XML, properties, HCL).
    #[default]
    Comprehensive,
    /// Every readable text file, documentation included.
    Deep,
}

impl ScanDepth {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Comprehensive => "comprehensive",
            Self::Deep => "deep",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "comprehensive" => Some(Self::Comprehensive),
            "deep" => Some(Self::Deep),
            _ => None,
        }
    }
}

/// Configuration for building a file inventory from a local directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum file size in bytes. Larger files are left out of the inventory. Default: 1 MiB.
    pub max_file_size: Option<u64>,
    /// Additional directory names to skip, on top of the built-in list.
    pub extra_ignore: Vec<String>,
    /// Follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Respect `.gitignore` files. Default: true.
    pub respect_gitignore: Option<bool>,
    /// Files pattern evaluation reads. Default: comprehensive.
    pub depth: Option<ScanDepth>,
}

impl ScanConfig {
    /// Directories never worth scanning.
    pub const DEFAULT_IGNORED_DIRS: &'static [&'static str] = &[
        ".git",
        "node_modules",
        "__pycache__",
        ".pytest_cache",
        "target",
        ".venv",
        "vendor",
        "dist",
    ];

    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(1024 * 1024)
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }

    pub fn effective_respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(true)
    }

    pub fn effective_depth(&self) -> ScanDepth {
        self.depth.unwrap_or_default()
    }

    /// Returns true if a directory with this name should be skipped.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        Self::DEFAULT_IGNORED_DIRS.contains(&name) || self.extra_ignore.iter().any(|d| d == name)
    }
}
