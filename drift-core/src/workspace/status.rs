//! Workspace status — the `IWorkspaceStorage::status` backing query
//! . Cheap filesystem/pragma reads,
//! distinct from the materialised `StatusSnapshot` which is refreshed only
//! at end-of-scan.

use std::path::Path;

use rusqlite::Connection;

use crate::traits::storage::workspace_types::WorkspaceStatus;

use super::errors::WorkspaceResult;
use super::migration::get_schema_version;

pub fn workspace_status(drift_dir: &Path) -> WorkspaceResult<WorkspaceStatus> {
    let db_path = drift_dir.join("drift.db");
    if !db_path.exists() {
        return Ok(WorkspaceStatus {
            initialized: false,
            db_path: None,
            schema_version: 0,
            file_count: 0,
            db_size_bytes: 0,
            wal_size_bytes: 0,
            lock_held: false,
        });
    }

    let conn = Connection::open(&db_path)?;
    let schema_version = get_schema_version(&conn)?;
    let db_size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
    let wal_path = drift_dir.join("drift.db-wal");
    let wal_size_bytes = std::fs::metadata(&wal_path).map(|m| m.len()).unwrap_or(0);
    let lock_held = drift_dir.join("workspace.lock").exists()
        && std::fs::OpenOptions::new()
            .write(true)
            .open(drift_dir.join("workspace.lock"))
            .is_err();

    // The `files` table belongs to drift-storage's analysis migration
    // ladder, applied to this same database file; query it defensively so
    // workspace status still works before the first scan has run.
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
        lock_held,
    })
}
