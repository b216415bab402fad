//! Backslash escape expansion for configured frame/append strings.
//!
//! Input and output are single-byte text: every character must be in
//! U+0000..=U+00FF, so each output character maps to exactly one byte on
//! the wire.

use crate::domain::error::{SermonError, SermonResult};

/// Expand backslash escapes in `raw`.
///
/// Recognised: `\\ \' \" \a \b \f \n \r \t \v`, `\xNN` (two hex digits),
/// `\N`..`\NNN` (octal, at most 0o377) and backslash-newline (dropped).
/// Any other escaped character is kept together with its backslash.
pub fn decode_escapes(raw: &str) -> SermonResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        check_single_byte(c, offset)?;
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some((_, escaped)) = chars.next() else {
            return Err(escape_error(offset, "trailing backslash"));
        };
        match escaped {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '\n' => {}
            'x' => {
                let mut value = 0u32;
                for _ in 0..2 {
                    let digit = chars
                        .next_if(|(_, d)| d.is_ascii_hexdigit())
                        .and_then(|(_, d)| d.to_digit(16))
                        .ok_or_else(|| escape_error(offset, "\\x needs two hex digits"))?;
                    value = value * 16 + digit;
                }
                out.push(byte_char(value));
            }
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.next_if(|(_, d)| matches!(d, '0'..='7')) {
                        Some((_, d)) => value = value * 8 + d.to_digit(8).unwrap_or_default(),
                        None => break,
                    }
                }
                if value > 0xFF {
                    return Err(escape_error(
                        offset,
                        format!("octal escape \\{:o} exceeds one byte", value),
                    ));
                }
                out.push(byte_char(value));
            }
            other => {
                check_single_byte(other, offset + 1)?;
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn check_single_byte(c: char, offset: usize) -> SermonResult<()> {
    if u32::from(c) > 0xFF {
        return Err(SermonError::Encoding {
            character: c,
            offset,
        });
    }
    Ok(())
}

fn byte_char(value: u32) -> char {
    char::from(value as u8)
}

fn escape_error(offset: usize, message: impl Into<String>) -> SermonError {
    SermonError::Escape {
        offset,
        message: message.into(),
    }
}
