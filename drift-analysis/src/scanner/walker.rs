//! Parallel directory walk via the `ignore` crate's gitignore-aware
//! `WalkBuilder`.

use std::path::{Path, PathBuf};

use drift_core::config::ScanConfig;
use drift_core::errors::ScanError;

/// Default ignore directories layered on top of `.gitignore`/`.driftignore`
/// rules, mirroring the conventions of every language ecosystem this engine
/// supports.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    ".next",
    ".nuxt",
    "__pycache__",
    ".pytest_cache",
    "coverage",
    ".nyc_output",
    "vendor",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    "bin",
    "obj",
    ".drift",
];

pub fn walk(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, ScanError> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .add_custom_ignore_filename(".driftignore")
        .follow_links(config.follow_symlinks);

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    if !config.include_globs.is_empty() {
        for pattern in &config.include_globs {
            let _ = overrides.add(pattern);
        }
    }
    for pattern in DEFAULT_IGNORES {
        let _ = overrides.add(&format!("!{pattern}/**"));
        let _ = overrides.add(&format!("!{pattern}"));
    }
    for pattern in &config.exclude_globs {
        let _ = overrides.add(&format!("!{pattern}"));
    }
    if let Ok(built) = overrides.build() {
        builder.overrides(built);
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                if entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "walk entry error");
            }
        }
    }
    files.sort();
    Ok(files)
}
