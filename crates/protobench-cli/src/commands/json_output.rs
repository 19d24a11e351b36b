//! JSON output types for machine-readable CLI output.
//!
//! These back the `--json` flag on `encode`, `decode`, and `types`, so that
//! editors and scripts can consume results without scraping colored text.

use anyhow::{Context, Result};
use protobench_compiler::CompilerError;
use protobench_spec::{BackendError, Diagnostic};
use serde::{Deserialize, Serialize};

use crate::input::InputError;

/// Error codes for CLI operations.
///
/// These codes are stable. Compiler failures pass through their own
/// `PROTOC_XXX` codes.
pub mod error_codes {
    /// File or stdin could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Text input is not valid UTF-8
    pub const NOT_UTF8: &str = "CLI_002";
    /// Hex input is malformed
    pub const INVALID_HEX: &str = "CLI_003";
    /// Schema declares no message types and no root was given
    pub const NO_MESSAGE_TYPES: &str = "CLI_004";
    /// Output file could not be written
    pub const FILE_WRITE: &str = "CLI_005";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "PROTOC_007")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category (if known)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category: None,
        }
    }

    /// Adds a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl From<&CompilerError> for JsonError {
    fn from(err: &CompilerError) -> Self {
        JsonError::new(err.code(), err.message()).with_category(err.category())
    }
}

impl From<&InputError> for JsonError {
    fn from(err: &InputError) -> Self {
        JsonError::new(err.code(), err.to_string()).with_category("input")
    }
}

/// Output of `protobench encode --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodeOutput {
    /// True when protoc produced output or reported nothing.
    pub success: bool,
    /// Root message type that was encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_type: Option<String>,
    /// Encoded bytes as space-separated hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_hex: Option<String>,
    /// Number of encoded bytes
    pub size: usize,
    /// File the bytes were written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Parsed compiler diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Unparsed compiler diagnostics text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_diagnostics: String,
    /// Infrastructure and input errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

impl EncodeOutput {
    /// Creates a failed output carrying a single error.
    pub fn failure(error: JsonError) -> Self {
        Self {
            success: false,
            root_type: None,
            encoded_hex: None,
            size: 0,
            output_file: None,
            diagnostics: Vec::new(),
            raw_diagnostics: String::new(),
            errors: vec![error],
        }
    }
}

/// Output of `protobench decode --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecodeOutput {
    /// True when protoc produced output or reported nothing.
    pub success: bool,
    /// Root message type that was decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_type: Option<String>,
    /// Decoded text-format message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<String>,
    /// File the text was written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Parsed compiler diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Unparsed compiler diagnostics text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_diagnostics: String,
    /// Infrastructure and input errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

impl DecodeOutput {
    /// Creates a failed output carrying a single error.
    pub fn failure(error: JsonError) -> Self {
        Self {
            success: false,
            root_type: None,
            decoded: None,
            output_file: None,
            diagnostics: Vec::new(),
            raw_diagnostics: String::new(),
            errors: vec![error],
        }
    }
}

/// Output of `protobench types --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypesOutput {
    /// Schema file that was scanned
    pub schema: String,
    /// Declared message types in source order
    pub types: Vec<String>,
    /// Type chosen when no root is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_root: Option<String>,
    /// Input errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{}", json);
    Ok(())
}
