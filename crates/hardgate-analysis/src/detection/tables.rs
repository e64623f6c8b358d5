//! Static lookup tables mapping manifests and deployment descriptors to labels.

/// Manifest file name → framework/toolchain name.
pub const MANIFESTS: &[(&str, &str)] = &[
    ("package.json", "node"),
    ("pom.xml", "maven"),
    ("build.gradle", "gradle"),
    ("build.gradle.kts", "gradle"),
    ("settings.gradle", "gradle"),
    ("requirements.txt", "pip"),
    ("pyproject.toml", "pip"),
    ("setup.py", "pip"),
    ("pipfile", "pip"),
    ("go.mod", "go-modules"),
    ("cargo.toml", "cargo"),
    ("gemfile", "bundler"),
    ("composer.json", "composer"),
];

/// Manifest suffixes that are matched by extension rather than full name.
pub const MANIFEST_SUFFIXES: &[(&str, &str)] = &[(".csproj", "dotnet"), (".sln", "dotnet")];

/// Platforms that imply an automated deployment target.
pub const DEPLOYMENT_PLATFORMS: &[&str] = &[
    "kubernetes",
    "terraform",
    "serverless",
    "cloudformation",
    "app-engine",
    "paas",
];

/// Synthetic platform emitted whenever any deployment platform is present.
pub const DEPLOYMENT: &str = "deployment";

/// Directory names whose YAML contents are treated as Kubernetes manifests.
const KUBERNETES_DIRS: &[&str] = &["k8s", "kubernetes", "helm", "charts"];

/// Framework name for a manifest file, if any. Case-insensitive.
pub fn framework_for(file_name: &str) -> Option<&'static str> {
    let lower = file_name.to_ascii_lowercase();
    MANIFESTS
        .iter()
        .find(|(name, _)| *name == lower)
        .or_else(|| {
            MANIFEST_SUFFIXES
                .iter()
                .find(|(suffix, _)| lower.ends_with(suffix))
        })
        .map(|(_, framework)| *framework)
}

/// Platform name implied by a path, if any. Case-insensitive.
pub fn platform_for(path: &str) -> Option<&'static str> {
    let lower = path.to_ascii_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);
    let in_dir = |names: &[&str]| {
        lower
            .split('/')
            .rev()
            .skip(1)
            .any(|segment| names.contains(&segment))
    };
    let is_yaml = file_name.ends_with(".yaml") || file_name.ends_with(".yml");

    if file_name == "dockerfile"
        || file_name.starts_with("dockerfile.")
        || file_name.starts_with("docker-compose.")
        || file_name.starts_with("compose.")
    {
        return Some("container");
    }
    if matches!(
        file_name,
        "chart.yaml" | "kustomization.yaml" | "kustomization.yml" | "skaffold.yaml"
    ) || (is_yaml && (file_name.starts_with("deployment.") || file_name.starts_with("hpa.")))
        || (is_yaml && in_dir(KUBERNETES_DIRS))
    {
        return Some("kubernetes");
    }
    if file_name.ends_with(".tf") {
        return Some("terraform");
    }
    if matches!(file_name, "serverless.yml" | "serverless.yaml") {
        return Some("serverless");
    }
    if matches!(file_name, "template.yaml" | "template.yml")
        || (is_yaml && in_dir(&["cloudformation"]))
    {
        return Some("cloudformation");
    }
    if file_name == "app.yaml" {
        return Some("app-engine");
    }
    if file_name == "procfile" {
        return Some("paas");
    }
    None
}
