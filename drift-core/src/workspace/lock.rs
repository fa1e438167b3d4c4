//! Process-level lock file preventing two concurrent scans on the same
//! database.

use std::fs::File;
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::errors::WorkspaceError;

/// Advisory file lock at `.drift/workspace.lock`. A shared (read) lock
/// allows concurrent queries; an exclusive (write) lock is held for the
/// duration of a scan, migration, or restore.
pub struct WorkspaceLock {
    inner: RwLock<File>,
    path: PathBuf,
}

impl WorkspaceLock {
    pub fn open(drift_dir: &Path) -> Result<Self, WorkspaceError> {
        let path = drift_dir.join("workspace.lock");
        let file = File::create(&path)?;
        Ok(Self {
            inner: RwLock::new(file),
            path,
        })
    }

    /// Non-blocking shared lock for a read-only operation.
    pub fn try_read(&mut self) -> Result<RwLockReadGuard<'_, File>, WorkspaceError> {
        self.inner.try_read().map_err(|_| WorkspaceError::Locked {
            operation: "read".into(),
            message: "a write operation is in progress".into(),
        })
    }

    /// Non-blocking exclusive lock for a scan, migration, or restore.
    pub fn try_write(&mut self) -> Result<RwLockWriteGuard<'_, File>, WorkspaceError> {
        self.inner.try_write().map_err(|_| WorkspaceError::Locked {
            operation: "write".into(),
            message: "another scan or mutation is already in progress".into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
