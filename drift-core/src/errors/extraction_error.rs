//! Extractor errors. Extraction never fails outright; these
//! are recorded alongside a partial `FileIndex`, never propagated upward.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("handler {handler_id} panicked on node kind {node_kind}: {message}")]
    HandlerPanic {
        handler_id: String,
        node_kind: String,
        message: String,
    },

    #[error("extraction cancelled after {files_processed} files")]
    Cancelled { files_processed: usize },
}

impl DriftErrorCode for ExtractionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HandlerPanic { .. } => error_code::HANDLER_PANIC,
            Self::Cancelled { .. } => error_code::EXTRACTION_CANCELLED,
        }
    }
}
