//! Monorepo detection and per-package partitioning of the scan root.
//! Multi-package repositories are still one logical `Project`; this module
//! only attributes files to a package for reporting, it does not create a
//! second project.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::errors::WorkspaceResult;

#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub name: String,
    pub path: PathBuf,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub enum WorkspaceLayout {
    SinglePackage,
    Monorepo { packages: Vec<PackageInfo> },
}

/// Detect common monorepo markers: npm/yarn/pnpm workspaces, Cargo
/// workspace members, a Lerna config, or an Nx/Turborepo config.
pub fn detect_workspace(root: &Path) -> WorkspaceLayout {
    let mut packages = Vec::new();

    if let Ok(text) = std::fs::read_to_string(root.join("package.json")) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            if let Some(workspaces) = value.get("workspaces") {
                let globs: Vec<String> = match workspaces {
                    serde_json::Value::Array(arr) => arr
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                    serde_json::Value::Object(obj) => obj
                        .get("packages")
                        .and_then(|p| p.as_array())
                        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                        .unwrap_or_default(),
                    _ => Vec::new(),
                };
                for glob_pattern in globs {
                    packages.extend(resolve_package_glob(root, &glob_pattern));
                }
            }
        }
    }

    if let Ok(text) = std::fs::read_to_string(root.join("Cargo.toml")) {
        if let Ok(value) = text.parse::<toml::Value>() {
            if let Some(members) = value
                .get("workspace")
                .and_then(|w| w.get("members"))
                .and_then(|m| m.as_array())
            {
                for member in members.iter().filter_map(|v| v.as_str()) {
                    packages.extend(resolve_package_glob(root, member));
                }
            }
        }
    }

    if packages.is_empty() {
        WorkspaceLayout::SinglePackage
    } else {
        WorkspaceLayout::Monorepo { packages }
    }
}

fn resolve_package_glob(root: &Path, pattern: &str) -> Vec<PackageInfo> {
    let full_pattern = root.join(pattern).display().to_string();
    glob::glob(&full_pattern)
        .map(|paths| {
            paths
                .filter_map(Result::ok)
                .filter(|p| p.is_dir())
                .map(|path| PackageInfo {
                    name: path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("package")
                        .to_string(),
                    language: None,
                    path,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Persist the detected packages into `workspace_packages`, replacing any
/// prior registration for a path that changed language/framework.
pub fn register_packages(conn: &Connection, root: &Path, packages: &[PackageInfo], now: i64) -> WorkspaceResult<()> {
    for (i, package) in packages.iter().enumerate() {
        let relative = package
            .path
            .strip_prefix(root)
            .unwrap_or(&package.path)
            .display()
            .to_string();
        conn.execute(
            "INSERT INTO workspace_packages (id, name, path, language, framework, dependencies_json, created_at)
             VALUES (?1, ?2, ?3, ?4, NULL, '[]', ?5)
             ON CONFLICT(path) DO UPDATE SET name = excluded.name, language = excluded.language",
            rusqlite::params![
                format!("pkg-{i}-{relative}"),
                package.name,
                relative,
                package.language,
                now,
            ],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_package_repo_has_no_packages() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(detect_workspace(dir.path()), WorkspaceLayout::SinglePackage));
    }

    #[test]
    fn npm_workspaces_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"workspaces": ["packages/*"]}"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("packages/a")).unwrap();
        std::fs::create_dir_all(dir.path().join("packages/b")).unwrap();

        match detect_workspace(dir.path()) {
            WorkspaceLayout::Monorepo { packages } => assert_eq!(packages.len(), 2),
            WorkspaceLayout::SinglePackage => panic!("expected monorepo layout"),
        }
    }
}
