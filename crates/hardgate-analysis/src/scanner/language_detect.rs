//! Language detection from file extension.

use serde::{Deserialize, Serialize};

/// Languages and configuration formats recognised in an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Ruby,
    Php,
    Kotlin,
    Cpp,
    C,
    Swift,
    Scala,
    Json,
    Yaml,
    Toml,
    Xml,
    Properties,
    Hcl,
}

impl Language {
    /// Detect language from a file extension string.
    pub fn from_extension(ext: Option<&str>) -> Option<Language> {
        let ext = ext?.to_ascii_lowercase();
        match ext.as_str() {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            "rb" | "rake" | "gemspec" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "kt" | "kts" => Some(Language::Kotlin),
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Some(Language::Cpp),
            "c" | "h" => Some(Language::C),
            "swift" => Some(Language::Swift),
            "scala" | "sc" => Some(Language::Scala),
            "json" => Some(Language::Json),
            "yaml" | "yml" => Some(Language::Yaml),
            "toml" => Some(Language::Toml),
            "xml" => Some(Language::Xml),
            "properties" | "conf" | "config" | "ini" => Some(Language::Properties),
            "tf" | "hcl" => Some(Language::Hcl),
            _ => None,
        }
    }

    /// Detect language from a path's final extension.
    pub fn from_path(path: &str) -> Option<Language> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let ext = file_name.rsplit_once('.').map(|(_, ext)| ext);
        Self::from_extension(ext)
    }

    /// Whether this is a programming language as opposed to a config/data format.
    pub fn is_programming(&self) -> bool {
        !matches!(
            self,
            Language::Json
                | Language::Yaml
                | Language::Toml
                | Language::Xml
                | Language::Properties
                | Language::Hcl
        )
    }

    /// Stable lowercase identifier, used in technology labels.
    pub fn id(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Kotlin => "kotlin",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Swift => "swift",
            Language::Scala => "scala",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Xml => "xml",
            Language::Properties => "properties",
            Language::Hcl => "hcl",
        }
    }

    /// Returns the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Kotlin => "Kotlin",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Swift => "Swift",
            Language::Scala => "Scala",
            Language::Json => "JSON",
            Language::Yaml => "YAML",
            Language::Toml => "TOML",
            Language::Xml => "XML",
            Language::Properties => "Properties",
            Language::Hcl => "HCL",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
