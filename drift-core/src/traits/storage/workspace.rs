//! `IWorkspaceStorage` — workspace lifecycle operations: init, status,
//! backup, compaction, migration.
//!
//! SQLite-specific operations (backup, integrity check) return
//! `StorageError::NotSupported` for a backend that doesn't support them.

use std::sync::Arc;

use crate::errors::StorageError;

use super::workspace_types::{
    BackupResult, GcStats, IntegrityResult, ProjectInfo, StatusSnapshot, WorkspaceStatus,
};

/// Workspace lifecycle storage operations: initialization, status, project
/// info, GC, backup, integrity check, schema version.
pub trait IWorkspaceStorage: Send + Sync {
    /// Create the database file and run every pending migration.
    fn initialize(&self, path: &str) -> Result<(), StorageError>;

    fn status(&self) -> Result<WorkspaceStatus, StorageError>;

    fn project_info(&self) -> Result<ProjectInfo, StorageError>;

    /// The `query_status()` external operation — a pre-aggregated snapshot
    /// refreshed at the end of each successful scan, not computed on read.
    fn status_snapshot(&self) -> Result<StatusSnapshot, StorageError>;

    /// Recompute `status_snapshot`'s backing materialised view. Called at
    /// the end of a successful scan, never on a read path.
    fn refresh_status_snapshot(&self) -> Result<(), StorageError>;

    fn gc(&self) -> Result<GcStats, StorageError>;

    /// Online page-stream backup. Never a raw file copy, which is unsafe
    /// under WAL.
    fn backup(&self, destination: &str) -> Result<BackupResult, StorageError>;

    fn integrity_check(&self) -> Result<IntegrityResult, StorageError>;

    fn schema_version(&self) -> Result<u32, StorageError>;
}

impl<T: IWorkspaceStorage + ?Sized> IWorkspaceStorage for Arc<T> {
    fn initialize(&self, path: &str) -> Result<(), StorageError> {
        (**self).initialize(path)
    }
    fn status(&self) -> Result<WorkspaceStatus, StorageError> {
        (**self).status()
    }
    fn project_info(&self) -> Result<ProjectInfo, StorageError> {
        (**self).project_info()
    }
    fn status_snapshot(&self) -> Result<StatusSnapshot, StorageError> {
        (**self).status_snapshot()
    }
    fn refresh_status_snapshot(&self) -> Result<(), StorageError> {
        (**self).refresh_status_snapshot()
    }
    fn gc(&self) -> Result<GcStats, StorageError> {
        (**self).gc()
    }
    fn backup(&self, destination: &str) -> Result<BackupResult, StorageError> {
        (**self).backup(destination)
    }
    fn integrity_check(&self) -> Result<IntegrityResult, StorageError> {
        (**self).integrity_check()
    }
    fn schema_version(&self) -> Result<u32, StorageError> {
        (**self).schema_version()
    }
}
