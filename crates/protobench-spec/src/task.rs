//! Encode/decode tasks and their results.
//!
//! A task is created by the caller for a single request and consumed once by
//! the orchestrator. Results pair the converted payload with the compiler's
//! diagnostic text; see [`EncodeResult::is_failure`] for how the two combine.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{parse_diagnostics, Diagnostic};

/// A request to turn a textual message into its binary wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeTask {
    /// Schema text defining the message types.
    pub schema: String,
    /// Textual representation of the message instance.
    pub message_text: String,
    /// Name of the message type within the schema to encode as.
    pub root_type: String,
}

impl EncodeTask {
    /// Creates a new encode task.
    pub fn new(
        schema: impl Into<String>,
        message_text: impl Into<String>,
        root_type: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            message_text: message_text.into(),
            root_type: root_type.into(),
        }
    }
}

/// A request to turn a binary wire encoding back into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeTask {
    /// Schema text defining the message types.
    pub schema: String,
    /// Raw wire bytes of the message instance.
    pub message_binary: Vec<u8>,
    /// Name of the message type within the schema to decode as.
    pub root_type: String,
}

impl DecodeTask {
    /// Creates a new decode task.
    pub fn new(
        schema: impl Into<String>,
        message_binary: impl Into<Vec<u8>>,
        root_type: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            message_binary: message_binary.into(),
            root_type: root_type.into(),
        }
    }
}

/// Outcome of an encode request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeResult {
    /// Wire bytes exactly as the compiler emitted them. Empty when encoding failed.
    pub encoded: Vec<u8>,
    /// Text the compiler wrote to its error stream. May hold warnings even on success.
    pub diagnostics: String,
}

impl EncodeResult {
    /// Returns true when the compiler produced no output but complained.
    ///
    /// An empty message legitimately encodes to zero bytes, so an empty
    /// payload alone is not a failure.
    pub fn is_failure(&self) -> bool {
        self.encoded.is_empty() && has_text(&self.diagnostics)
    }

    /// Returns true when the compiler printed anything on its error stream.
    pub fn has_diagnostics(&self) -> bool {
        has_text(&self.diagnostics)
    }

    /// Parses the diagnostic text into structured entries.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        parse_diagnostics(&self.diagnostics)
    }
}

/// Outcome of a decode request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeResult {
    /// Text form of the message. Empty when decoding failed.
    pub decoded: String,
    /// Text the compiler wrote to its error stream.
    pub diagnostics: String,
}

impl DecodeResult {
    /// Returns true when the compiler produced no output but complained.
    pub fn is_failure(&self) -> bool {
        !has_text(&self.decoded) && has_text(&self.diagnostics)
    }

    /// Returns true when the compiler printed anything on its error stream.
    pub fn has_diagnostics(&self) -> bool {
        has_text(&self.diagnostics)
    }

    /// Parses the diagnostic text into structured entries.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        parse_diagnostics(&self.diagnostics)
    }
}

fn has_text(s: &str) -> bool {
    !s.trim().is_empty()
}
