//! Byte literal rendering and hex parsing.
//!
//! Encoded messages are shown to people as hex or pasted into source code as
//! array literals; decode input is usually typed or pasted as hex.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::HexError;

/// How to render a byte sequence as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteLiteral {
    /// Space separated pairs: `08 03 10 04`.
    #[default]
    Hex,
    /// C# array initializer: `new byte[] { 0x08, 0x03 }`.
    CSharp,
    /// Rust array literal: `[0x08, 0x03]`.
    Rust,
}

impl ByteLiteral {
    /// Returns the string identifier for this literal style.
    pub fn as_str(&self) -> &'static str {
        match self {
            ByteLiteral::Hex => "hex",
            ByteLiteral::CSharp => "csharp",
            ByteLiteral::Rust => "rust",
        }
    }
}

impl FromStr for ByteLiteral {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(ByteLiteral::Hex),
            "csharp" | "c#" => Ok(ByteLiteral::CSharp),
            "rust" => Ok(ByteLiteral::Rust),
            other => Err(format!(
                "unknown byte literal style '{}', expected hex, csharp or rust",
                other
            )),
        }
    }
}

/// Renders `bytes` in the requested literal style.
pub fn render_bytes(bytes: &[u8], style: ByteLiteral) -> String {
    match style {
        ByteLiteral::Hex => join_bytes(bytes, "", " "),
        ByteLiteral::CSharp => {
            if bytes.is_empty() {
                "new byte[] { }".to_string()
            } else {
                format!("new byte[] {{ {} }}", join_bytes(bytes, "0x", ", "))
            }
        }
        ByteLiteral::Rust => format!("[{}]", join_bytes(bytes, "0x", ", ")),
    }
}

fn join_bytes(bytes: &[u8], prefix: &str, separator: &str) -> String {
    let mut out = String::with_capacity(bytes.len() * (2 + prefix.len() + separator.len()));
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{}{:02x}", prefix, b);
    }
    out
}

/// Parses hex text into bytes.
///
/// Accepts groups separated by whitespace, commas or brackets. Each group is
/// either a run of digit pairs (`0803`) or a `0x`-prefixed value; a prefixed
/// value may be a single digit (`0x8`).
pub fn parse_hex(text: &str) -> Result<Vec<u8>, HexError> {
    let mut bytes = Vec::new();
    let mut start: Option<usize> = None;

    let end = std::iter::once((text.len(), ' '));
    for (i, ch) in text.char_indices().chain(end) {
        if is_separator(ch) {
            if let Some(s) = start.take() {
                parse_group(&text[s..i], s, &mut bytes)?;
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    Ok(bytes)
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}')
}

fn parse_group(group: &str, offset: usize, out: &mut Vec<u8>) -> Result<(), HexError> {
    let (digits, digits_offset, prefixed) =
        match group.strip_prefix("0x").or_else(|| group.strip_prefix("0X")) {
            Some(rest) => (rest, offset + 2, true),
            None => (group, offset, false),
        };

    if let Some((i, ch)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidCharacter {
            ch,
            position: digits_offset + i,
        });
    }

    let digits = digits.as_bytes();
    if prefixed && digits.len() == 1 {
        out.push(nibble(digits[0]));
        return Ok(());
    }
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(HexError::OddLength {
            group: group.to_string(),
            position: offset,
        });
    }

    out.extend(
        digits
            .chunks_exact(2)
            .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1])),
    );
    Ok(())
}

// Callers only pass validated ASCII hex digits.
fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const POINT: [u8; 4] = [0x08, 0x03, 0x10, 0x04];

    #[test]
    fn test_render_styles() {
        assert_eq!(render_bytes(&POINT, ByteLiteral::Hex), "08 03 10 04");
        assert_eq!(
            render_bytes(&POINT, ByteLiteral::CSharp),
            "new byte[] { 0x08, 0x03, 0x10, 0x04 }"
        );
        assert_eq!(render_bytes(&POINT, ByteLiteral::Rust), "[0x08, 0x03, 0x10, 0x04]");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_bytes(&[], ByteLiteral::Hex), "");
        assert_eq!(render_bytes(&[], ByteLiteral::CSharp), "new byte[] { }");
        assert_eq!(render_bytes(&[], ByteLiteral::Rust), "[]");
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("08 03 10 04").unwrap(), POINT);
        assert_eq!(parse_hex("08031004").unwrap(), POINT);
        assert_eq!(parse_hex("0x08,0x3, 0X10 ,0x4").unwrap(), POINT);
        assert_eq!(parse_hex("[0x08, 0x03, 0x10, 0x04]").unwrap(), POINT);
        assert_eq!(parse_hex("FF\n\tab").unwrap(), vec![0xff, 0xab]);
        assert!(parse_hex("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_invalid_character() {
        assert_eq!(
            parse_hex("08 0g"),
            Err(HexError::InvalidCharacter {
                ch: 'g',
                position: 4
            })
        );
        assert_eq!(
            parse_hex("0xzz"),
            Err(HexError::InvalidCharacter {
                ch: 'z',
                position: 2
            })
        );
    }

    #[test]
    fn test_parse_hex_odd_length() {
        assert_eq!(
            parse_hex("08 031"),
            Err(HexError::OddLength {
                group: "031".to_string(),
                position: 3
            })
        );
        assert!(matches!(parse_hex("0x"), Err(HexError::OddLength { .. })));
    }

    #[test]
    fn test_byte_literal_from_str() {
        assert_eq!("C#".parse::<ByteLiteral>(), Ok(ByteLiteral::CSharp));
        assert_eq!("rust".parse::<ByteLiteral>(), Ok(ByteLiteral::Rust));
        assert!("octal".parse::<ByteLiteral>().is_err());
    }

    proptest! {
        #[test]
        fn prop_hex_and_rust_literals_parse_back(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(parse_hex(&render_bytes(&bytes, ByteLiteral::Hex)).unwrap(), bytes.clone());
            prop_assert_eq!(parse_hex(&render_bytes(&bytes, ByteLiteral::Rust)).unwrap(), bytes);
        }
    }
}
