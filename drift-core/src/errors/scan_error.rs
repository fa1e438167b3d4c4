//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan cancelled after {files_processed} files")]
    Cancelled { files_processed: usize },
}

impl DriftErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PathNotFound { .. } => error_code::PATH_NOT_FOUND,
            Self::PermissionDenied { .. } => error_code::PERMISSION_DENIED,
            Self::IoError { .. } => error_code::SCAN_IO_ERROR,
            Self::Cancelled { .. } => error_code::SCAN_CANCELLED,
        }
    }

    fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::PathNotFound { .. } => Some("verify the scan root path exists"),
            Self::PermissionDenied { .. } => {
                Some("check filesystem permissions for the reported path")
            }
            _ => None,
        }
    }
}
