//! Structured compiler diagnostics.
//!
//! `protoc` reports problems on its error stream, one per line, in the format
//! selected by `--error_format`:
//!
//! | Format | Line shape |
//! |--------|------------|
//! | `msvs` | `file(line) : error in column=col: message` |
//! | `gcc`  | `file:line:col: message` |
//!
//! Lines that fit neither shape (`Type not defined: Foo`, library log lines)
//! are kept as unlocated entries so nothing the compiler said is lost.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const MSVS_PATTERN: &str =
    r"^(?P<file>.+?)\((?P<line>\d+)\) : (?P<sev>error|warning) in column=(?P<col>\d+): (?P<msg>.*)$";
const GCC_PATTERN: &str = r"^(?P<file>[^:\s][^:]*):(?P<line>\d+):(?P<col>\d+): (?P<msg>.*)$";
const FILE_ONLY_PATTERN: &str = r"^(?P<file>[^:\s]+\.proto): (?P<msg>.*)$";

static MSVS_REGEX: OnceLock<Regex> = OnceLock::new();
static GCC_REGEX: OnceLock<Regex> = OnceLock::new();
static FILE_ONLY_REGEX: OnceLock<Regex> = OnceLock::new();

/// Diagnostic output format requested from the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFormat {
    /// Visual Studio style: `file(line) : error in column=col: message`.
    #[default]
    Msvs,
    /// GCC style: `file:line:col: message`.
    Gcc,
}

impl ErrorFormat {
    /// Returns the string identifier for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorFormat::Msvs => "msvs",
            ErrorFormat::Gcc => "gcc",
        }
    }

    /// Returns the compiler flag selecting this format.
    pub fn flag(&self) -> String {
        format!("--error_format={}", self.as_str())
    }
}

impl fmt::Display for ErrorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "msvs" => Ok(ErrorFormat::Msvs),
            "gcc" => Ok(ErrorFormat::Gcc),
            other => Err(format!(
                "unknown error format '{}', expected 'msvs' or 'gcc'",
                other
            )),
        }
    }
}

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One diagnostic line reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File the diagnostic refers to, when the compiler named one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// 1-based line number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic with no location.
    pub fn unlocated(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            column: None,
            severity,
            message: message.into(),
        }
    }

    /// Returns true for error-severity diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(col)) => {
                write!(f, "{}:{}:{}: {}: {}", file, line, col, severity, self.message)
            }
            (Some(file), _, _) => write!(f, "{}: {}: {}", file, severity, self.message),
            _ => write!(f, "{}: {}", severity, self.message),
        }
    }
}

/// Parses compiler diagnostic text into structured entries.
///
/// Blank lines are skipped. Both `msvs` and `gcc` shapes are recognized
/// regardless of the format that was requested.
pub fn parse_diagnostics(text: &str) -> Vec<Diagnostic> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Diagnostic {
    let msvs = MSVS_REGEX.get_or_init(|| Regex::new(MSVS_PATTERN).expect("invalid regex pattern"));
    if let Some(caps) = msvs.captures(line) {
        let severity = if &caps["sev"] == "warning" {
            Severity::Warning
        } else {
            Severity::Error
        };
        return Diagnostic {
            file: Some(caps["file"].to_string()),
            line: caps["line"].parse().ok(),
            column: caps["col"].parse().ok(),
            severity,
            message: caps["msg"].to_string(),
        };
    }

    let gcc = GCC_REGEX.get_or_init(|| Regex::new(GCC_PATTERN).expect("invalid regex pattern"));
    if let Some(caps) = gcc.captures(line) {
        let (severity, message) = split_severity(&caps["msg"]);
        return Diagnostic {
            file: Some(caps["file"].to_string()),
            line: caps["line"].parse().ok(),
            column: caps["col"].parse().ok(),
            severity,
            message,
        };
    }

    let file_only =
        FILE_ONLY_REGEX.get_or_init(|| Regex::new(FILE_ONLY_PATTERN).expect("invalid regex pattern"));
    if let Some(caps) = file_only.captures(line) {
        let (severity, message) = split_severity(&caps["msg"]);
        return Diagnostic {
            file: Some(caps["file"].to_string()),
            line: None,
            column: None,
            severity,
            message,
        };
    }

    let severity = if line.to_ascii_lowercase().contains("warning") {
        Severity::Warning
    } else {
        Severity::Error
    };
    Diagnostic::unlocated(severity, line.trim())
}

fn split_severity(message: &str) -> (Severity, String) {
    if let Some(rest) = message.strip_prefix("warning: ") {
        (Severity::Warning, rest.to_string())
    } else if let Some(rest) = message.strip_prefix("error: ") {
        (Severity::Error, rest.to_string())
    } else {
        (Severity::Error, message.to_string())
    }
}
