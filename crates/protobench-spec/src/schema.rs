//! Message type discovery.
//!
//! The compiler owns schema parsing; this module only scans the text for
//! `message <Name> {` declarations so a caller can offer a list of root types
//! and pick a sensible default. Nested declarations are reported too, since
//! the scan does not track braces.

use regex::Regex;
use std::sync::OnceLock;

const MESSAGE_PATTERN: &str = r"\bmessage\s+(\w+)\s*\{";

static MESSAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn message_regex() -> &'static Regex {
    MESSAGE_REGEX.get_or_init(|| Regex::new(MESSAGE_PATTERN).expect("invalid regex pattern"))
}

/// Returns the names of all message types declared in `schema`, in source order.
///
/// A name declared more than once is reported once, at its first position.
pub fn message_types(schema: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in message_regex().captures_iter(schema) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Picks the root type to operate on after the schema changed.
///
/// Keeps `current` while the schema still declares it; otherwise falls back
/// to the last declared message type. Returns `None` when the schema declares
/// no message types at all.
pub fn select_root_type(schema: &str, current: Option<&str>) -> Option<String> {
    let types = message_types(schema);

    if let Some(current) = current.filter(|c| !c.trim().is_empty()) {
        if types.iter().any(|t| t == current) {
            return Some(current.to_string());
        }
    }

    types.last().cloned()
}
