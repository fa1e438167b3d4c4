//! Hot backup via SQLite's page-stream Backup API — never a raw file
//! copy, which is incorrect under WAL.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::backup::Backup;
use rusqlite::Connection;
use tracing::info;

use super::errors::{WorkspaceError, WorkspaceResult};
use super::migration::get_schema_version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupReason {
    SchemaMigration,
    UserRequested,
    PreDestructiveOperation,
    Scheduled,
}

impl BackupReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SchemaMigration => "schema_migration",
            Self::UserRequested => "user_requested",
            Self::PreDestructiveOperation => "pre_destructive",
            Self::Scheduled => "scheduled",
        }
    }

    /// to backups): operational backups are pruned aggressively, scheduled
    /// ones kept longer.
    pub fn tier(self) -> &'static str {
        match self {
            Self::SchemaMigration | Self::PreDestructiveOperation | Self::UserRequested => "operational",
            Self::Scheduled => "daily",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackupManifest {
    pub id: String,
    pub reason: BackupReason,
    pub created_at: i64,
    pub db_size_bytes: u64,
    pub schema_version: u32,
    pub backup_path: PathBuf,
    pub integrity_verified: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct BackupRetention {
    pub max_operational: u32,
    pub max_daily: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            max_operational: 5,
            max_daily: 7,
        }
    }
}

/// Take a hot backup of `source` into `backups_dir`, via the engine's
/// page-stream API rather than a raw file copy (unsafe under WAL).
pub fn create_backup(
    source: &Connection,
    backups_dir: &Path,
    reason: BackupReason,
    now: i64,
) -> WorkspaceResult<BackupManifest> {
    std::fs::create_dir_all(backups_dir)?;

    let id = format!("{now}-{}", reason.as_str());
    let backup_path = backups_dir.join(format!("{id}.db"));

    let start = Instant::now();
    let mut dest = Connection::open(&backup_path)?;
    {
        let backup = Backup::new(source, &mut dest)?;
        backup.run_to_completion(100, Duration::from_millis(10), None)?;
    }
    drop(dest);

    let db_size_bytes = std::fs::metadata(&backup_path).map(|m| m.len()).unwrap_or(0);
    let schema_version = get_schema_version(source)?;

    let verify_conn = Connection::open(&backup_path)?;
    let integrity_verified = quick_integrity_check(&verify_conn);

    let manifest = BackupManifest {
        id,
        reason,
        created_at: now,
        db_size_bytes,
        schema_version,
        backup_path,
        integrity_verified,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        reason = reason.as_str(),
        size_bytes = manifest.db_size_bytes,
        verified = manifest.integrity_verified,
        "workspace backup created"
    );

    Ok(manifest)
}

fn quick_integrity_check(conn: &Connection) -> bool {
    conn.query_row("PRAGMA quick_check", [], |row| row.get::<_, String>(0))
        .map(|result| result == "ok")
        .unwrap_or(false)
}

/// Restore `destination` from `backup_path`, verifying integrity first.
/// Used by `StorageError::Corrupt` recovery and by
/// `drift_core::workspace::integrity::auto_recover`.
pub fn restore_from_backup(backup_path: &Path, destination: &Path) -> WorkspaceResult<()> {
    if !backup_path.exists() {
        return Err(WorkspaceError::BackupNotFound(
            backup_path.display().to_string(),
        ));
    }
    let verify = Connection::open(backup_path)?;
    if !quick_integrity_check(&verify) {
        return Err(WorkspaceError::NoVerifiedBackup);
    }
    drop(verify);

    if destination.exists() {
        std::fs::remove_file(destination)?;
    }
    std::fs::copy(backup_path, destination)?;
    Ok(())
}

/// Prune backups beyond the retention window, oldest first within a tier.
pub fn prune_backups(
    manifests: &mut Vec<BackupManifest>,
    retention: BackupRetention,
) -> Vec<BackupManifest> {
    manifests.sort_by_key(|m| std::cmp::Reverse(m.created_at));
    let mut operational = 0u32;
    let mut daily = 0u32;
    let mut keep = Vec::new();
    let mut drop = Vec::new();
    for manifest in manifests.drain(..) {
        let (count, limit) = if manifest.reason.tier() == "daily" {
            daily += 1;
            (daily, retention.max_daily)
        } else {
            operational += 1;
            (operational, retention.max_operational)
        };
        if count <= limit {
            keep.push(manifest);
        } else {
            drop.push(manifest);
        }
    }
    *manifests = keep;
    drop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::migration::initialize_workspace_db;

    #[test]
    fn backup_round_trips_and_verifies() {
        let source = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&source).unwrap();
        source
            .execute(
                "INSERT INTO workspace_config (key, value, updated_at) VALUES ('k','v',0)",
                [],
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let manifest = create_backup(&source, dir.path(), BackupReason::UserRequested, 1000).unwrap();
        assert!(manifest.integrity_verified);
        assert!(manifest.backup_path.exists());

        let restored = dir.path().join("restored.db");
        restore_from_backup(&manifest.backup_path, &restored).unwrap();
        let check = Connection::open(&restored).unwrap();
        let value: String = check
            .query_row("SELECT value FROM workspace_config WHERE key='k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "v");
    }
}
