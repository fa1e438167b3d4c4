//! `SqliteWorkspaceStorage` — the concrete `IWorkspaceStorage` implementation
//! wiring together migration, backup, GC and integrity-check modules over a
//! single shared connection.
//!
//! The analysis tables (`files`, `functions`,...) this implementation
//! queries for `project_info`/`status_snapshot` belong to drift-storage's
//! migration ladder, applied to the same database file; every query against
//! them tolerates the table being absent (pre-first-scan) rather than
//! failing.

use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::errors::StorageError;
use crate::traits::storage::workspace::IWorkspaceStorage;
use crate::traits::storage::workspace_types::{
    BackupResult, GcStats, IntegrityResult, ProjectInfo, StatusSnapshot, WorkspaceStatus,
};

use super::backup::{create_backup, BackupReason};
use super::gc::{garbage_collect, GcOptions};
use super::integrity::verify_workspace;
use super::migration::{get_schema_version, initialize_workspace_db};

pub struct SqliteWorkspaceStorage {
    conn: Mutex<Connection>,
    drift_dir: PathBuf,
    project_root: PathBuf,
}

impl SqliteWorkspaceStorage {
    pub fn open(drift_dir: PathBuf, project_root: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(drift_dir.join("drift.db"))?;
        initialize_workspace_db(&conn).map_err(|e| StorageError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
            drift_dir,
            project_root,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn now(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl IWorkspaceStorage for SqliteWorkspaceStorage {
    fn initialize(&self, _path: &str) -> Result<(), StorageError> {
        initialize_workspace_db(&self.lock()).map_err(|e| StorageError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })
    }

    fn status(&self) -> Result<WorkspaceStatus, StorageError> {
        let conn = self.lock();
        let schema_version = get_schema_version(&conn)?;
        let db_path = self.drift_dir.join("drift.db");
        let db_size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
        let wal_size_bytes = std::fs::metadata(self.drift_dir.join("drift.db-wal"))
            .map(|m| m.len())
            .unwrap_or(0);
        let file_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .unwrap_or(0);
        Ok(WorkspaceStatus {
            initialized: true,
            db_path: Some(db_path.display().to_string()),
            schema_version,
            file_count,
            db_size_bytes,
            wal_size_bytes,
            lock_held: false,
        })
    }

    fn project_info(&self) -> Result<ProjectInfo, StorageError> {
        let conn = self.lock();
        let root_path = self.project_root.display().to_string();

        let language_breakdown: Vec<(String, i64)> = conn
            .prepare("SELECT language, COUNT(*) FROM files GROUP BY language")
            .and_then(|mut stmt| {
                stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                    .and_then(Iterator::collect)
            })
            .unwrap_or_default();

        let count_of = |table: &str| -> i64 {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap_or(0)
        };
        let last_scan_at: Option<i64> = conn
            .query_row("SELECT MAX(finished_at) FROM scans", [], |row| row.get(0))
            .unwrap_or(None);

        Ok(ProjectInfo {
            root_path,
            total_files: count_of("files"),
            total_functions: count_of("functions"),
            total_patterns: count_of("patterns"),
            total_violations: count_of("violations"),
            language_breakdown,
            last_scan_at,
        })
    }

    fn status_snapshot(&self) -> Result<StatusSnapshot, StorageError> {
        let conn = self.lock();
        let schema_version = get_schema_version(&conn)?;

        let languages: Vec<String> = super::context::get_context(&conn, "languages")
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        let frameworks: Vec<String> = super::context::get_context(&conn, "frameworks")
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();

        let count_of = |table: &str| -> i64 {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap_or(0)
        };
        let last_scan_at: Option<i64> = conn
            .query_row("SELECT MAX(finished_at) FROM scans", [], |row| row.get(0))
            .unwrap_or(None);

        Ok(StatusSnapshot {
            root_path: self.project_root.display().to_string(),
            languages,
            frameworks,
            file_count: count_of("files"),
            function_count: count_of("functions"),
            pattern_count: count_of("patterns"),
            violation_count: count_of("violations"),
            boundary_count: count_of("boundaries"),
            last_scan_at,
            schema_version,
        })
    }

    fn refresh_status_snapshot(&self) -> Result<(), StorageError> {
        let conn = self.lock();
        let languages: Vec<String> = conn
            .prepare("SELECT DISTINCT language FROM files WHERE language IS NOT NULL")
            .and_then(|mut stmt| {
                stmt.query_map([], |row| row.get(0)).and_then(Iterator::collect)
            })
            .unwrap_or_default();
        super::context::refresh_workspace_context(&conn, &languages, &[], self.now())
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })
    }

    fn gc(&self) -> Result<GcStats, StorageError> {
        let conn = self.lock();
        let report = garbage_collect(&conn, &GcOptions::default())
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        Ok(GcStats {
            orphan_rows_removed: report.old_events_deleted,
            stale_cache_entries_removed: 0,
            wal_checkpointed: report.wal_checkpointed,
            freed_bytes: report
                .freelist_pages_before
                .saturating_sub(report.freelist_pages_after)
                * 4096,
        })
    }

    fn backup(&self, destination: &str) -> Result<BackupResult, StorageError> {
        let conn = self.lock();
        let backups_dir = std::path::Path::new(destination);
        let manifest = create_backup(&conn, backups_dir, BackupReason::UserRequested, self.now())
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        Ok(BackupResult {
            destination: manifest.backup_path.display().to_string(),
            size_bytes: manifest.db_size_bytes,
            duration_ms: manifest.duration_ms,
        })
    }

    fn integrity_check(&self) -> Result<IntegrityResult, StorageError> {
        let report = verify_workspace(&self.drift_dir, &self.project_root);
        let mut issues = Vec::new();
        if let super::integrity::DatabaseIntegrity::QuickCheckFailed(msg) = &report.database {
            issues.push(msg.clone());
        }
        if let Some(err) = &report.config_parse_error {
            issues.push(err.clone());
        }
        Ok(IntegrityResult {
            ok: report.healthy,
            issues,
        })
    }

    fn schema_version(&self) -> Result<u32, StorageError> {
        Ok(get_schema_version(&self.lock())?)
    }
}
