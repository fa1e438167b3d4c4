//! Resolver/graph-builder errors.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("resolution cancelled at revision {revision}")]
    Cancelled { revision: u64 },
}

impl DriftErrorCode for ResolutionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => error_code::RESOLUTION_CANCELLED,
        }
    }
}
