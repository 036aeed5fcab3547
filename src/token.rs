//! Helpers for the single-line token form.
//!
//! Tokens are safe to embed in a URI path segment or a delimited string:
//!
//! - negative numbers are parenthesised, `-42` becomes `(42)`
//! - strings escape reserved and control characters as `%HH`, characters above `0xFF`
//!   as `uHHHH` (one per UTF-16 unit), and the letter `u` itself as `%75`
//! - binary payloads are URL-safe base64 without padding
//!
//! ```rust
//! use propcodec::token;
//!
//! assert_eq!(token::encode_string("a b"), "a%20b");
//! assert_eq!(token::decode_string("a%20b").unwrap(), "a b");
//! assert_eq!(token::format_number("-42"), "(42)");
//! ```

use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn is_reserved(unit: u16) -> bool {
    unit < 0x20
        || unit == 0x7F
        || matches!(
            u8::try_from(unit).map(char::from),
            Ok(' ' | ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | ',' | '-' | '.' | '!'
                | '<' | '>' | '#' | '%' | '"' | '{' | '}' | '|' | '\\' | '^' | '[' | ']' | '`'
                | 'u' | '(' | ')')
        )
}

/// Escapes a string for the token form.
#[must_use]
pub fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for unit in s.encode_utf16() {
        if unit > 0xFF {
            out.push('u');
            for shift in [12, 8, 4, 0] {
                out.push(char::from(HEX[usize::from((unit >> shift) & 0xF)]));
            }
        } else if is_reserved(unit) {
            out.push('%');
            out.push(char::from(HEX[usize::from(unit >> 4)]));
            out.push(char::from(HEX[usize::from(unit & 0xF)]));
        } else {
            // 0x20..=0xFF maps one to one onto a char
            out.push(char::from(unit as u8));
        }
    }
    out
}

/// Reverses [`encode_string`].
///
/// # Errors
///
/// Returns a format error for a truncated or non-hex escape, or for escapes that do not
/// form valid UTF-16.
pub fn decode_string(token: &str) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        let digits = match c {
            '%' => 2,
            'u' => 4,
            _ => {
                let mut buf = [0u16; 2];
                units.extend_from_slice(c.encode_utf16(&mut buf));
                continue;
            }
        };
        let mut unit = 0u16;
        for _ in 0..digits {
            let digit = chars
                .next()
                .and_then(|h| h.to_digit(16))
                .ok_or_else(|| Error::format(format!("malformed escape in token: {}", token)))?;
            unit = (unit << 4) | digit as u16;
        }
        units.push(unit);
    }
    String::from_utf16(&units)
        .map_err(|_| Error::format(format!("token is not valid UTF-16: {}", token)))
}

/// Rewrites a leading minus sign as parentheses.
#[must_use]
pub fn format_number(text: &str) -> String {
    match text.strip_prefix('-') {
        Some(magnitude) => format!("({})", magnitude),
        None => text.to_string(),
    }
}

/// Rewrites a parenthesised number as a negative one; other text is returned unchanged.
#[must_use]
pub fn parse_number(token: &str) -> String {
    if token.len() > 2 && token.starts_with('(') && token.ends_with(')') {
        format!("-{}", &token[1..token.len() - 1])
    } else {
        token.to_string()
    }
}

#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn decode_base64(token: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| Error::format(format!("invalid base64 token: {}", e)))
}
