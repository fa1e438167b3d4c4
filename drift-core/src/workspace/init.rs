//! `workspace_init` — the entry point that ties detection, migration,
//! and project registration together and caches the resulting context.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::context::refresh_workspace_context;
use super::ci::{detect_ci_environment, is_ci};
use super::detect::{detect_frameworks, detect_languages, generate_config_template};
use super::errors::{WorkspaceError, WorkspaceResult};
use super::migration::{get_schema_version, initialize_workspace_db};
use super::monorepo::{detect_workspace, register_packages, WorkspaceLayout};
use super::project::{generate_project_id, register_project};

#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Re-run detection and re-write `drift.toml` even if the workspace
    /// already exists. Does not touch already-persisted analysis data.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self { force: false }
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    pub project_id: String,
    pub root_path: PathBuf,
    pub drift_path: PathBuf,
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub schema_version: u32,
    pub ci_environment: Option<&'static str>,
}

pub fn is_initialized(root: &Path) -> bool {
    root.join(".drift").join("drift.db").exists()
}

/// Initialize (or re-detect) a workspace at `root`: create `.drift/`, apply
/// every pending migration, detect languages/frameworks/package layout, and
/// seed the context cache. Idempotent — re-running against an initialized
/// workspace only refreshes detection, never discards persisted analysis
/// data (discarding that is a destructive operation, handled separately).
pub fn workspace_init(root: &Path, project_name: &str, opts: &InitOptions) -> WorkspaceResult<WorkspaceInfo> {
    let drift_dir = root.join(".drift");
    let already_initialized = is_initialized(root);
    if already_initialized && !opts.force {
        return open_workspace(root);
    }

    std::fs::create_dir_all(&drift_dir)?;
    std::fs::create_dir_all(drift_dir.join("backups"))?;

    let conn = Connection::open(drift_dir.join("drift.db"))?;
    initialize_workspace_db(&conn)?;

    let now = now_seconds();
    let project_id = generate_project_id();
    register_project(
        &conn,
        &project_id,
        project_name,
        &root.display().to_string(),
        &drift_dir.display().to_string(),
        now,
    )?;
    // The freshly registered project becomes active; a workspace with a
    // prior project from an earlier init stays inactive until switched.
    conn.execute("UPDATE project_registry SET is_active = 0", [])?;
    conn.execute(
        "UPDATE project_registry SET is_active = 1 WHERE id = ?1",
        [&project_id],
    )?;

    let languages = detect_languages(root);
    let frameworks = detect_frameworks(root);

    if let WorkspaceLayout::Monorepo { packages } = detect_workspace(root) {
        register_packages(&conn, root, &packages, now)?;
    }

    refresh_workspace_context(&conn, &languages, &frameworks, now)?;

    let config_path = root.join("drift.toml");
    if !config_path.exists() {
        std::fs::write(&config_path, generate_config_template(project_name))?;
    }

    conn.execute(
        "INSERT INTO workspace_events (event_type, details_json, created_at) VALUES ('workspace_init', NULL, ?1)",
        [now],
    )?;

    Ok(WorkspaceInfo {
        project_id,
        root_path: root.to_path_buf(),
        drift_path: drift_dir,
        languages,
        frameworks,
        schema_version: get_schema_version(&conn)?,
        ci_environment: detect_ci_environment().map(|ci| ci.as_str()),
    })
}

/// Open an already-initialized workspace without re-running detection.
pub fn open_workspace(root: &Path) -> WorkspaceResult<WorkspaceInfo> {
    let drift_dir = root.join(".drift");
    if !is_initialized(root) {
        return Err(WorkspaceError::NotInitialized);
    }
    let conn = Connection::open(drift_dir.join("drift.db"))?;
    initialize_workspace_db(&conn)?;

    let project_id = super::project::get_active_project(&conn)?
        .map(|p| p.id)
        .unwrap_or_default();

    let languages: Vec<String> = super::context::get_context(&conn, "languages")?
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default();
    let frameworks: Vec<String> = super::context::get_context(&conn, "frameworks")?
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default();

    Ok(WorkspaceInfo {
        project_id,
        root_path: root.to_path_buf(),
        drift_path: drift_dir,
        languages,
        frameworks,
        schema_version: get_schema_version(&conn)?,
        ci_environment: if is_ci() {
            detect_ci_environment().map(|ci| ci.as_str())
        } else {
            None
        },
    })
}

fn now_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_drift_dir_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let info = workspace_init(dir.path(), "demo", &InitOptions::default()).unwrap();
        assert!(dir.path().join(".drift/drift.db").exists());
        assert!(dir.path().join("drift.toml").exists());
        assert_eq!(info.schema_version, super::super::migration::latest_schema_version());
    }

    #[test]
    fn re_init_without_force_just_opens() {
        let dir = tempfile::tempdir().unwrap();
        let first = workspace_init(dir.path(), "demo", &InitOptions::default()).unwrap();
        let second = workspace_init(dir.path(), "demo", &InitOptions::default()).unwrap();
        assert_eq!(first.project_id, second.project_id);
    }

    #[test]
    fn open_workspace_fails_when_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(open_workspace(dir.path()), Err(WorkspaceError::NotInitialized)));
    }
}
