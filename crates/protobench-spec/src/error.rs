//! Error types shared across protobench crates.

use thiserror::Error;

/// Common trait for backend errors.
///
/// This trait provides a unified interface for error reporting across
/// protobench crates. Each error type implements it to expose:
/// - Stable error codes for reporting
/// - Human-readable messages for users
/// - A category for grouping related errors
///
/// # Example
///
/// ```ignore
/// use protobench_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "PROTOC_001". These codes are stable and
    /// can be used for programmatic error handling.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    fn category(&self) -> &'static str;
}

/// Errors produced while parsing hex text into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// A character that is neither a hex digit nor a separator.
    #[error("invalid hex character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    /// A group of hex digits with an odd length.
    #[error("odd number of hex digits in '{group}' at position {position}")]
    OddLength { group: String, position: usize },
}

impl BackendError for HexError {
    fn code(&self) -> &'static str {
        match self {
            HexError::InvalidCharacter { .. } => "HEX_001",
            HexError::OddLength { .. } => "HEX_002",
        }
    }

    fn category(&self) -> &'static str {
        "hex"
    }
}
