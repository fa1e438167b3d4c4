//! Language/framework auto-detection from ecosystem marker files, used to
//! seed `project_info` at `workspace_init` time and to decide which
//! framework middleware to enable without a config entry.

use std::path::Path;

const MARKER_LANGUAGES: &[(&str, &[&str])] = &[
    ("typescript", &["tsconfig.json"]),
    ("javascript", &["package.json"]),
    ("python", &["requirements.txt", "pyproject.toml", "setup.py", "Pipfile"]),
    ("java", &["pom.xml", "build.gradle", "build.gradle.kts"]),
    ("php", &["composer.json"]),
    ("go", &["go.mod"]),
    ("rust", &["Cargo.toml"]),
    ("ruby", &["Gemfile"]),
];

/// Detect languages present at the workspace root by ecosystem marker
/// files. A lightweight complement to the scanner's per-file extension
/// classification — this runs once, at init, over project-level files.
pub fn detect_languages(root: &Path) -> Vec<String> {
    let mut languages = Vec::new();
    for (lang, markers) in MARKER_LANGUAGES {
        if markers.iter().any(|m| root.join(m).exists()) {
            languages.push((*lang).to_string());
        }
    }
    if languages.iter().any(|l| l == "typescript") {
        languages.retain(|l| l != "javascript");
    }
    languages
}

/// Detect frameworks from dependency manifests, feeding the framework
/// middleware enable decision: middleware stays disabled until its
/// heuristics detect the framework in the project's dependency manifest.
pub fn detect_frameworks(root: &Path) -> Vec<String> {
    let mut frameworks = Vec::new();

    if let Ok(content) = std::fs::read_to_string(root.join("package.json")) {
        let checks: &[(&str, &str)] = &[
            ("\"express\"", "express"),
            ("\"@nestjs/core\"", "nestjs"),
            ("\"react\"", "react"),
            ("\"next\"", "nextjs"),
            ("\"fastify\"", "fastify"),
        ];
        for (needle, name) in checks {
            if content.contains(needle) {
                frameworks.push((*name).to_string());
            }
        }
    }

    for file in ["requirements.txt", "pyproject.toml", "Pipfile"] {
        if let Ok(content) = std::fs::read_to_string(root.join(file)) {
            let lower = content.to_lowercase();
            for (needle, name) in [("django", "django"), ("flask", "flask"), ("fastapi", "fastapi")] {
                if lower.contains(needle) && !frameworks.iter().any(|f| f == name) {
                    frameworks.push(name.to_string());
                }
            }
        }
    }

    for file in ["pom.xml", "build.gradle", "build.gradle.kts"] {
        if let Ok(content) = std::fs::read_to_string(root.join(file)) {
            if content.contains("spring-boot") {
                frameworks.push("spring".to_string());
                break;
            }
        }
    }

    frameworks
}

/// Render a starter `drift.toml` for a freshly initialized workspace. The
/// file is user-editable afterward; this only seeds sane defaults.
pub fn generate_config_template(project_name: &str) -> String {
    format!(
        r#"# Drift configuration for {project_name}.
# Every field defaults sanely when absent, so this file only needs to
# declare overrides.

[scan]
exclude_globs = ["node_modules", "dist", "build", "target", ".git", "__pycache__", "vendor"]

[thresholds]
# pattern_min_files = 5
# pattern_min_occurrences = 10

[gates]
fail_on = "error"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rust_from_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname=\"x\"").unwrap();
        assert_eq!(detect_languages(dir.path()), vec!["rust".to_string()]);
    }

    #[test]
    fn typescript_marker_suppresses_javascript() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
        let langs = detect_languages(dir.path());
        assert!(langs.contains(&"typescript".to_string()));
        assert!(!langs.contains(&"javascript".to_string()));
    }
}
