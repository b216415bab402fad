//! Inline byte-literal syntax: `$(1, 2, 0x1F)` or `${1, 2, 0x1F}`.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::config::ByteListPolicy;
use crate::domain::error::{SermonError, SermonResult};

/// Either bracket style; the closing bracket must match the opening one.
static BYTE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\((?P<paren>[^)]*)\)|\{(?P<brace>[^}]*)\})")
        .unwrap_or_else(|e| panic!("byte literal pattern failed to compile: {e}"))
});

/// One piece of a processed command, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text sent one byte per character.
    Literal(&'a str),
    /// Inner text of a byte literal, without the `$(`/`)` delimiters.
    ByteList(&'a str),
}

/// Split `command` into literal and byte-list segments in source order.
///
/// Literal segments are emitted before every byte list and once at the
/// end, even when empty, so the sequence always alternates
/// `Literal, ByteList, Literal, ..., Literal`.
pub fn segments(command: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in BYTE_LITERAL.captures_iter(command) {
        let Some(whole) = caps.get(0) else { continue };
        let inner = caps
            .name("paren")
            .or_else(|| caps.name("brace"))
            .map_or("", |m| m.as_str());
        out.push(Segment::Literal(&command[last..whole.start()]));
        out.push(Segment::ByteList(inner));
        last = whole.end();
    }
    out.push(Segment::Literal(&command[last..]));

    out
}

/// Failure to read one byte-list element as an integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("empty element")]
    Empty,
    #[error("'{literal}' is not a valid base-{radix} integer")]
    InvalidDigits { literal: String, radix: u32 },
    #[error("'{0}' is too large")]
    OutOfRange(String),
}

/// Parse an integer literal, picking the base from its prefix.
///
/// `0x`/`0X` hex, `0o`/`0O` or a bare leading `0` octal, `0b`/`0B` binary,
/// decimal otherwise. An optional `+`/`-` sign may precede the prefix.
pub fn parse_int_literal(text: &str) -> Result<i128, LiteralError> {
    if text.is_empty() {
        return Err(LiteralError::Empty);
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x") | Some("0X") => (16, &unsigned[2..]),
        Some("0o") | Some("0O") => (8, &unsigned[2..]),
        Some("0b") | Some("0B") => (2, &unsigned[2..]),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => (8, &unsigned[1..]),
        _ => (10, unsigned),
    };

    // from_str_radix would accept a second sign here
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(LiteralError::InvalidDigits {
            literal: text.to_string(),
            radix,
        });
    }

    let magnitude = i128::from_str_radix(digits, radix)
        .map_err(|_| LiteralError::OutOfRange(text.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse one element and keep its low eight bits.
pub fn parse_byte(element: &str) -> Result<u8, LiteralError> {
    parse_int_literal(element.trim()).map(|value| (value & 0xFF) as u8)
}

/// A byte-list element that was dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedElement {
    pub element: String,
    pub error: LiteralError,
}

impl std::fmt::Display for RejectedElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.element, self.error)
    }
}

/// Bytes produced by one byte-list segment plus whatever was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedByteList {
    pub bytes: Vec<u8>,
    pub rejected: Vec<RejectedElement>,
}

/// Decode the comma-separated inner text of a byte literal under `policy`.
pub fn decode_byte_list(list: &str, policy: ByteListPolicy) -> DecodedByteList {
    let mut decoded = DecodedByteList::default();

    for element in list.split(',') {
        match parse_byte(element) {
            Ok(byte) => decoded.bytes.push(byte),
            Err(error) => decoded.rejected.push(RejectedElement {
                element: element.trim().to_string(),
                error,
            }),
        }
    }

    if policy == ByteListPolicy::RejectSegment && !decoded.rejected.is_empty() {
        decoded.bytes.clear();
    }
    decoded
}

/// Encode text one byte per character. Characters above U+00FF are an error.
pub fn encode_latin1(text: &str) -> SermonResult<Vec<u8>> {
    text.char_indices()
        .map(|(offset, character)| {
            u8::try_from(u32::from(character))
                .map_err(|_| SermonError::Encoding { character, offset })
        })
        .collect()
}

/// Inverse of [`encode_latin1`]; every byte is a valid character.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_without_literals() {
        assert_eq!(segments("AT+RST"), vec![Segment::Literal("AT+RST")]);
        assert_eq!(segments(""), vec![Segment::Literal("")]);
    }

    #[test]
    fn test_segments_both_syntaxes() {
        assert_eq!(
            segments("a$(1,2)b${3}c"),
            vec![
                Segment::Literal("a"),
                Segment::ByteList("1,2"),
                Segment::Literal("b"),
                Segment::ByteList("3"),
                Segment::Literal("c"),
            ]
        );
    }

    #[test]
    fn test_adjacent_literals_keep_empty_segment() {
        assert_eq!(
            segments("$(1)$(2)"),
            vec![
                Segment::Literal(""),
                Segment::ByteList("1"),
                Segment::Literal(""),
                Segment::ByteList("2"),
                Segment::Literal(""),
            ]
        );
    }

    #[test]
    fn test_brackets_do_not_cross() {
        // `)` cannot close `${`, so the brace form runs to its own `}`
        assert_eq!(
            segments("${1)}"),
            vec![
                Segment::Literal(""),
                Segment::ByteList("1)"),
                Segment::Literal(""),
            ]
        );
        // an unterminated `$(` stays literal text
        assert_eq!(segments("$(1"), vec![Segment::Literal("$(1")]);
        assert_eq!(segments("$(1}"), vec![Segment::Literal("$(1}")]);
        assert_eq!(segments("$ (1)"), vec![Segment::Literal("$ (1)")]);
    }

    #[test]
    fn test_parse_bases() {
        assert_eq!(parse_int_literal("16").unwrap(), 16);
        assert_eq!(parse_int_literal("0x10").unwrap(), 16);
        assert_eq!(parse_int_literal("0X10").unwrap(), 16);
        assert_eq!(parse_int_literal("020").unwrap(), 16);
        assert_eq!(parse_int_literal("0o20").unwrap(), 16);
        assert_eq!(parse_int_literal("0b10000").unwrap(), 16);
        assert_eq!(parse_int_literal("0").unwrap(), 0);
        assert_eq!(parse_int_literal("00").unwrap(), 0);
        assert_eq!(parse_int_literal("-1").unwrap(), -1);
        assert_eq!(parse_int_literal("+7").unwrap(), 7);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_int_literal(""), Err(LiteralError::Empty));
        assert!(matches!(
            parse_int_literal("08"),
            Err(LiteralError::InvalidDigits { radix: 8, .. })
        ));
        assert!(matches!(
            parse_int_literal("0x"),
            Err(LiteralError::InvalidDigits { radix: 16, .. })
        ));
        assert!(parse_int_literal("abc").is_err());
        assert!(parse_int_literal("--1").is_err());
        assert!(parse_int_literal("1 2").is_err());
        assert!(matches!(
            parse_int_literal("0xffffffffffffffffffffffffffffffffff"),
            Err(LiteralError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_byte_masks_and_trims() {
        assert_eq!(parse_byte(" 0x1F ").unwrap(), 31);
        assert_eq!(parse_byte("256").unwrap(), 0);
        assert_eq!(parse_byte("0x1FF").unwrap(), 255);
        assert_eq!(parse_byte("-1").unwrap(), 255);
    }

    #[test]
    fn test_decode_byte_list_policies() {
        let skipped = decode_byte_list("1, zz, 3", ByteListPolicy::SkipInvalid);
        assert_eq!(skipped.bytes, vec![1, 3]);
        assert_eq!(skipped.rejected.len(), 1);
        assert_eq!(skipped.rejected[0].element, "zz");

        let rejected = decode_byte_list("1, zz, 3", ByteListPolicy::RejectSegment);
        assert!(rejected.bytes.is_empty());
        assert_eq!(rejected.rejected.len(), 1);

        let clean = decode_byte_list("1,2,0x1F", ByteListPolicy::RejectSegment);
        assert_eq!(clean.bytes, vec![1, 2, 31]);
        assert!(clean.rejected.is_empty());
    }

    #[test]
    fn test_empty_list_is_one_empty_element() {
        let decoded = decode_byte_list("", ByteListPolicy::SkipInvalid);
        assert!(decoded.bytes.is_empty());
        assert_eq!(decoded.rejected[0].error, LiteralError::Empty);
    }

    #[test]
    fn test_latin1() {
        assert_eq!(encode_latin1("A\u{ff}\n").unwrap(), vec![0x41, 0xff, 0x0a]);
        assert!(matches!(
            encode_latin1("ok\u{100}"),
            Err(SermonError::Encoding { offset: 2, .. })
        ));
        assert_eq!(decode_latin1(&[0x41, 0xe9]), "A\u{e9}");
    }
}
