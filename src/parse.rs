//! Primitive literal parsing.
//!
//! Integers follow the usual source-literal rules: an optional sign (signed
//! targets only), an optional base prefix (`0x`, `0o`, `0b`, or a bare
//! leading `0` for octal), and `_` separators between digits. The result is
//! range-checked against the target's bit width.

use crate::error::CoerceError;

enum NumberError {
    Syntax,
    Range,
}

impl NumberError {
    fn into_coerce(self, text: &str, bits: u32) -> CoerceError {
        match self {
            NumberError::Syntax => CoerceError::InvalidInt {
                value: text.to_string(),
            },
            NumberError::Range => CoerceError::IntOutOfRange {
                value: text.to_string(),
                bits,
            },
        }
    }
}

/// Parse a signed integer that fits in `bits` bits.
pub(crate) fn parse_int(text: &str, bits: u32) -> Result<i64, CoerceError> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = parse_magnitude(unsigned).map_err(|e| e.into_coerce(text, bits))?;

    let cutoff = 1u64 << (bits - 1);
    if (!negative && magnitude >= cutoff) || (negative && magnitude > cutoff) {
        return Err(NumberError::Range.into_coerce(text, bits));
    }
    let value = magnitude as i64;
    Ok(if negative { value.wrapping_neg() } else { value })
}

/// Parse an unsigned integer that fits in `bits` bits. Any sign is a
/// syntax error.
pub(crate) fn parse_uint(text: &str, bits: u32) -> Result<u64, CoerceError> {
    let magnitude = parse_magnitude(text).map_err(|e| e.into_coerce(text, bits))?;
    if bits < u64::BITS && magnitude >> bits != 0 {
        return Err(NumberError::Range.into_coerce(text, bits));
    }
    Ok(magnitude)
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(text: &str) -> Result<bool, CoerceError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::InvalidBool {
            value: text.to_string(),
        }),
    }
}

fn parse_magnitude(text: &str) -> Result<u64, NumberError> {
    let (radix, digits, prefixed) = split_radix(text);
    if digits.starts_with(['+', '-']) {
        return Err(NumberError::Syntax);
    }
    let cleaned = strip_separators(digits, prefixed).ok_or(NumberError::Syntax)?;
    if cleaned.is_empty() {
        // A lone "0" has already been consumed as the octal prefix.
        return if text == "0" {
            Ok(0)
        } else {
            Err(NumberError::Syntax)
        };
    }
    u64::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => NumberError::Range,
        _ => NumberError::Syntax,
    })
}

fn split_radix(text: &str) -> (u32, &str, bool) {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        return match bytes[1] {
            b'x' | b'X' => (16, &text[2..], true),
            b'o' | b'O' => (8, &text[2..], true),
            b'b' | b'B' => (2, &text[2..], true),
            _ => (8, &text[1..], true),
        };
    }
    if text == "0" {
        return (8, "", true);
    }
    (10, text, false)
}

/// Remove `_` separators. Each one must sit between two digits, where a
/// base prefix counts as a digit. Returns `None` for a misplaced separator.
fn strip_separators(digits: &str, prefixed: bool) -> Option<String> {
    if !digits.contains('_') {
        return Some(digits.to_string());
    }
    let mut previous_is_digit = prefixed;
    let mut cleaned = String::with_capacity(digits.len());
    for c in digits.chars() {
        if c == '_' {
            if !previous_is_digit {
                return None;
            }
            previous_is_digit = false;
        } else {
            cleaned.push(c);
            previous_is_digit = true;
        }
    }
    previous_is_digit.then_some(cleaned)
}
