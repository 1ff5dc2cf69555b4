//! Error types for the batch engine.
//!
//! Two levels, mirroring how failures are handled:
//!
//! - [`SourceError`] - one input file could not be decoded. Batch operations
//!   record it and skip the file.
//! - [`EngineError`] - the operation as a whole failed. Every variant maps to
//!   an [`ErrorKind`] so callers can report "kind + message".
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! the reader, writer and transform layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Per-file errors
// =============================================================================

/// Errors while decoding a single input file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Byte stream is not a readable workbook / delimited text.
    #[error("Cannot decode '{file}': {message}")]
    Decode { file: String, message: String },

    /// Extension is missing or not in the allowed set.
    #[error("Unsupported file format: '{file}'")]
    UnsupportedFormat { file: String },
}

impl SourceError {
    pub fn decode(file: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            file: file.into(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Operation errors (top-level)
// =============================================================================

/// Stable error classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    UnsupportedFormat,
    ColumnNotFound,
    InvalidParameter,
    InvalidCondition,
    NoValidInput,
    NoMatch,
    PayloadTooLarge,
    Encode,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::UnsupportedFormat => "unsupported_format",
            Self::ColumnNotFound => "column_not_found",
            Self::InvalidParameter => "invalid_parameter",
            Self::InvalidCondition => "invalid_condition",
            Self::NoValidInput => "no_valid_input",
            Self::NoMatch => "no_match",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Encode => "encode",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input could not be decoded (single-input operations only).
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Split column is not present in the table.
    #[error("Column \"{0}\" does not exist")]
    ColumnNotFound(String),

    /// Malformed numeric / enum / list parameter.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Filter operator is not one of the recognized names.
    #[error("Invalid filter condition: '{0}'")]
    InvalidCondition(String),

    /// Every file of the batch was skipped, or nothing was left to emit.
    #[error("No valid input: {0}")]
    NoValidInput(String),

    /// Filter produced zero rows.
    #[error("No rows match the filter condition")]
    NoMatch,

    /// Inputs exceed the configured ceiling.
    #[error("Input too large: {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { actual: u64, limit: u64 },

    /// Writing a table or archive failed.
    #[error("Cannot encode output: {0}")]
    Encode(String),
}

impl EngineError {
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Source(SourceError::Decode { .. }) => ErrorKind::Decode,
            Self::Source(SourceError::UnsupportedFormat { .. }) => ErrorKind::UnsupportedFormat,
            Self::ColumnNotFound(_) => ErrorKind::ColumnNotFound,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::InvalidCondition(_) => ErrorKind::InvalidCondition,
            Self::NoValidInput(_) => ErrorKind::NoValidInput,
            Self::NoMatch => ErrorKind::NoMatch,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::Encode(_) => ErrorKind::Encode,
        }
    }
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

impl From<zip::result::ZipError> for EngineError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Encode(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding a single file.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
