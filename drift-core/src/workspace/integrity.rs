//! corrupt database never silently returns stale data; queries on a
//! corrupt database fail loudly.

use std::path::Path;

use rusqlite::Connection;

use super::backup::restore_from_backup;
use super::errors::WorkspaceResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseIntegrity {
    Ok,
    QuickCheckFailed(String),
    Missing,
}

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub database: DatabaseIntegrity,
    pub config_parse_error: Option<String>,
    pub healthy: bool,
}

/// Verify the workspace database and configuration. Does not attempt
/// recovery — see `auto_recover` for that.
pub fn verify_workspace(drift_dir: &Path, project_root: &Path) -> IntegrityReport {
    let db_path = drift_dir.join("drift.db");
    let database = if !db_path.exists() {
        DatabaseIntegrity::Missing
    } else {
        match Connection::open(&db_path) {
            Ok(conn) => match conn.query_row("PRAGMA quick_check", [], |row| row.get::<_, String>(0)) {
                Ok(result) if result == "ok" => DatabaseIntegrity::Ok,
                Ok(result) => DatabaseIntegrity::QuickCheckFailed(result),
                Err(err) => DatabaseIntegrity::QuickCheckFailed(err.to_string()),
            },
            Err(err) => DatabaseIntegrity::QuickCheckFailed(err.to_string()),
        }
    };

    let config_parse_error = {
        let toml_path = project_root.join("drift.toml");
        match std::fs::read_to_string(&toml_path) {
            Ok(text) => crate::config::DriftConfig::from_toml_str(&text)
                .err()
                .map(|e| e.to_string()),
            Err(_) => None,
        }
    };

    let healthy = matches!(database, DatabaseIntegrity::Ok) && config_parse_error.is_none();

    IntegrityReport {
        database,
        config_parse_error,
        healthy,
    }
}

/// Attempt automatic recovery from the most recent verified backup
/// second failure, surface"). Returns the restored `IntegrityReport`.
pub fn auto_recover(
    drift_dir: &Path,
    project_root: &Path,
    most_recent_verified_backup: Option<&Path>,
) -> WorkspaceResult<IntegrityReport> {
    if let Some(backup_path) = most_recent_verified_backup {
        let db_path = drift_dir.join("drift.db");
        restore_from_backup(backup_path, &db_path)?;
    }
    Ok(verify_workspace(drift_dir, project_root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let report = verify_workspace(dir.path(), dir.path());
        assert_eq!(report.database, DatabaseIntegrity::Missing);
        assert!(!report.healthy);
    }
}
