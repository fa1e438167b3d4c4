//! Storage-layer errors for SQLite operations.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("database busy (another writer in progress)")]
    Busy,

    #[error("database corrupt: {details}")]
    Corrupt { details: String },

    #[error("disk full")]
    Full,

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("schema mismatch: database is at version {found}, tool expects {expected}")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error("connection pool exhausted: {active} active connections")]
    ConnectionPoolExhausted { active: usize },

    #[error("operation not supported: {operation} — {reason}")]
    NotSupported { operation: String, reason: String },
}

impl DriftErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => error_code::DB_BUSY,
            Self::Corrupt { .. } => error_code::DB_CORRUPT,
            Self::Full => error_code::DISK_FULL,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::SchemaMismatch { .. } => error_code::SCHEMA_MISMATCH,
            _ => error_code::STORAGE_ERROR,
        }
    }

    fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::Full => Some("disk full — run retention purge or workspace gc"),
            Self::Corrupt { .. } => Some("restore from the most recent backup in .drift-backups/"),
            Self::Busy => Some("retry after the current writer completes"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi::ErrorCode;
        if let rusqlite::Error::SqliteFailure(sqlite_err, _) = &err {
            match sqlite_err.code {
                ErrorCode::DatabaseBusy => return StorageError::Busy,
                ErrorCode::DatabaseCorrupt => {
                    return StorageError::Corrupt {
                        details: err.to_string(),
                    }
                }
                ErrorCode::DiskFull => return StorageError::Full,
                _ => {}
            }
        }
        StorageError::SqliteError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            message: err.to_string(),
        }
    }
}
