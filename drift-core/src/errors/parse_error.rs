//! Parser pool errors. Syntactic errors in source are data (parse_errors on

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no parser registered for language {language}")]
    UnsupportedLanguage { language: String },

    #[error("internal parser error for language {language}: {message}")]
    InternalParserError { language: String, message: String },
}

impl DriftErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage { .. } => error_code::UNSUPPORTED_LANGUAGE,
            Self::InternalParserError { .. } => error_code::INTERNAL_PARSER_ERROR,
        }
    }
}
