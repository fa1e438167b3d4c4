//! Workspace-lifecycle error type.
//!
//! Distinct from `StorageError`: these are bookkeeping failures (already
//! initialized, locked, no verified backup) rather than SQL-level failures,
//! though a `StorageError` can always be wrapped into one.

use crate::errors::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("workspace already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("workspace not initialized — run workspace_init first")]
    NotInitialized,

    #[error("workspace locked: {message} (operation: {operation})")]
    Locked { operation: String, message: String },

    #[error("no verified backup available for recovery")]
    NoVerifiedBackup,

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("confirmation required for destructive operation {operation}")]
    ConfirmationRequired { operation: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl WorkspaceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized(_) => "WORKSPACE_ALREADY_INITIALIZED",
            Self::NotInitialized => "WORKSPACE_NOT_INITIALIZED",
            Self::Locked { .. } => "WORKSPACE_LOCKED",
            Self::NoVerifiedBackup => "WORKSPACE_NO_VERIFIED_BACKUP",
            Self::BackupNotFound(_) => "WORKSPACE_BACKUP_NOT_FOUND",
            Self::ConfirmationRequired { .. } => "WORKSPACE_CONFIRMATION_REQUIRED",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::TomlParse(_) => "CONFIG_PARSE_ERROR",
        }
    }
}

impl From<rusqlite::Error> for WorkspaceError {
    fn from(err: rusqlite::Error) -> Self {
        WorkspaceError::Storage(StorageError::from(err))
    }
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
