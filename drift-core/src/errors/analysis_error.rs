//! Derived-analysis errors: reachability, impact, coupling, taint, test
//! topology queries.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis cancelled at revision {revision}")]
    Cancelled { revision: u64 },

    #[error("{phase} exceeded hard timeout of {timeout_ms}ms")]
    TimeoutExceeded { phase: String, timeout_ms: u64 },
}

impl DriftErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => error_code::ANALYSIS_CANCELLED,
            Self::TimeoutExceeded { .. } => error_code::ANALYSIS_TIMEOUT,
        }
    }
}
