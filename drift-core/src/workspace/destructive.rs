//! Destructive-operation safety: any operation that would discard derived
//! data takes an automatic backup first, mirroring the backup-before-
//! migration rule the Knowledge Store already follows.

use rusqlite::Connection;

use super::backup::{create_backup, BackupManifest, BackupReason};
use super::errors::{WorkspaceError, WorkspaceResult};

/// Operations that discard derived data and must be confirmed and
/// backed up before proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveOperation {
    ForcedFullRescan,
    GarbageCollect,
    RestoreFromBackup,
    SchemaMigration,
}

impl DestructiveOperation {
    pub fn name(self) -> &'static str {
        match self {
            Self::ForcedFullRescan => "forced_full_rescan",
            Self::GarbageCollect => "garbage_collect",
            Self::RestoreFromBackup => "restore_from_backup",
            Self::SchemaMigration => "schema_migration",
        }
    }

    fn backup_reason(self) -> BackupReason {
        match self {
            Self::SchemaMigration => BackupReason::SchemaMigration,
            _ => BackupReason::PreDestructiveOperation,
        }
    }
}

/// Guard a destructive operation: require an explicit confirmation token
/// and take a backup first. `confirmation` must equal `"DELETE"` — the
/// same low-ceremony token the CLI surface uses, kept here so every
/// destructive path (not just the CLI) enforces it identically.
pub fn guard_destructive_operation(
    conn: &Connection,
    backups_dir: &std::path::Path,
    operation: DestructiveOperation,
    confirmation: &str,
    now: i64,
) -> WorkspaceResult<BackupManifest> {
    if confirmation != "DELETE" {
        return Err(WorkspaceError::ConfirmationRequired {
            operation: operation.name().to_string(),
        });
    }
    create_backup(conn, backups_dir, operation.backup_reason(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::migration::initialize_workspace_db;

    #[test]
    fn rejects_without_confirmation_token() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&conn).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let result = guard_destructive_operation(
            &conn,
            dir.path(),
            DestructiveOperation::GarbageCollect,
            "yes",
            0,
        );
        assert!(matches!(result, Err(WorkspaceError::ConfirmationRequired { .. })));
    }

    #[test]
    fn accepts_with_confirmation_token_and_backs_up() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_workspace_db(&conn).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let manifest = guard_destructive_operation(
            &conn,
            dir.path(),
            DestructiveOperation::GarbageCollect,
            "DELETE",
            0,
        )
        .unwrap();
        assert!(manifest.backup_path.exists());
    }
}
