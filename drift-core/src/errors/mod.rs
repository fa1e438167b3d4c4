//! Error taxonomy — one `thiserror` enum per subsystem.
//!
//! Every variant carries structured fields, never a pre-formatted message
//! alone, so callers can match on machine-readable shape. `error_code`
//! attaches a stable string code per variant for consumers (CI gate, IDE
//! diagnostics) that key behavior off an error identity rather than a
//! `Display` string.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod extraction_error;
pub mod parse_error;
pub mod resolution_error;
pub mod scan_error;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use extraction_error::ExtractionError;
pub use parse_error::ParseError;
pub use resolution_error::ResolutionError;
pub use scan_error::ScanError;
pub use storage_error::StorageError;
