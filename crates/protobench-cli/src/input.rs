//! Reading schemas and message payloads from files, hex text, or stdin.

use protobench_spec::{parse_hex, select_root_type, HexError};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Path argument meaning "standard input".
pub const STDIN_MARKER: &str = "-";

/// Errors that can occur while gathering command input.
#[derive(Debug)]
pub enum InputError {
    /// File could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Standard input could not be read.
    StdinRead { source: std::io::Error },

    /// Text payload is not valid UTF-8.
    NotUtf8 { origin: String },

    /// Hex payload is malformed.
    InvalidHex(HexError),

    /// No root type given and the schema declares none.
    NoMessageTypes { schema: PathBuf },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::FileRead { path, source } => {
                write!(f, "Failed to read file '{}': {}", path.display(), source)
            }
            InputError::StdinRead { source } => write!(f, "Failed to read stdin: {}", source),
            InputError::NotUtf8 { origin } => write!(f, "{} is not valid UTF-8 text", origin),
            InputError::InvalidHex(e) => write!(f, "Invalid hex input: {}", e),
            InputError::NoMessageTypes { schema } => write!(
                f,
                "Schema '{}' declares no message types; pass --root",
                schema.display()
            ),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::FileRead { source, .. } | InputError::StdinRead { source } => Some(source),
            InputError::InvalidHex(e) => Some(e),
            _ => None,
        }
    }
}

impl InputError {
    /// Returns the stable error code reported in JSON output.
    pub fn code(&self) -> &'static str {
        use crate::commands::json_output::error_codes;
        match self {
            InputError::FileRead { .. } | InputError::StdinRead { .. } => error_codes::FILE_READ,
            InputError::NotUtf8 { .. } => error_codes::NOT_UTF8,
            InputError::InvalidHex(_) => error_codes::INVALID_HEX,
            InputError::NoMessageTypes { .. } => error_codes::NO_MESSAGE_TYPES,
        }
    }
}

/// Returns true when `path` is absent or the stdin marker.
fn is_stdin(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == STDIN_MARKER)
}

fn read_file(path: &Path) -> Result<Vec<u8>, InputError> {
    std::fs::read(path).map_err(|source| InputError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn read_stdin() -> Result<Vec<u8>, InputError> {
    let mut buf = Vec::new();
    std::io::stdin()
        .lock()
        .read_to_end(&mut buf)
        .map_err(|source| InputError::StdinRead { source })?;
    Ok(buf)
}

fn into_text(bytes: Vec<u8>, origin: impl Into<String>) -> Result<String, InputError> {
    String::from_utf8(bytes).map_err(|_| InputError::NotUtf8 {
        origin: origin.into(),
    })
}

/// Reads a schema file as text.
pub fn read_schema(path: &Path) -> Result<String, InputError> {
    into_text(read_file(path)?, format!("Schema '{}'", path.display()))
}

/// Reads a text-format message from `path`, or from stdin when `path` is
/// `None` or `-`.
pub fn read_message_text(path: Option<&Path>) -> Result<String, InputError> {
    match path {
        Some(p) if !is_stdin(Some(p)) => {
            into_text(read_file(p)?, format!("Message '{}'", p.display()))
        }
        _ => into_text(read_stdin()?, "Standard input"),
    }
}

/// Reads a binary message from hex text, from `path`, or from stdin.
///
/// `hex` wins over `path`.
pub fn read_message_binary(path: Option<&Path>, hex: Option<&str>) -> Result<Vec<u8>, InputError> {
    if let Some(text) = hex {
        return parse_hex(text).map_err(InputError::InvalidHex);
    }
    match path {
        Some(p) if !is_stdin(Some(p)) => read_file(p),
        _ => read_stdin(),
    }
}

/// Picks the root message type: the explicit one when given, otherwise the
/// last message declared in the schema.
pub fn resolve_root_type(
    schema_path: &Path,
    schema: &str,
    root: Option<&str>,
) -> Result<String, InputError> {
    if let Some(root) = root.filter(|r| !r.trim().is_empty()) {
        return Ok(root.to_string());
    }
    select_root_type(schema, None).ok_or_else(|| InputError::NoMessageTypes {
        schema: schema_path.to_path_buf(),
    })
}
