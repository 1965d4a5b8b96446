//! Duration literals such as `300ms`, `1.5h` or `2h45m`.
//!
//! A duration is an optional sign followed by one or more decimal numbers,
//! each with an optional fraction and a required unit. Valid units are
//! `ns`, `us` (also `µs` and `μs`), `ms`, `s`, `m` and `h`. The bare string
//! `0` is accepted without a unit.

use std::time::Duration;

use thiserror::Error;

// Largest representable duration, in nanoseconds.
const MAX_NANOS: u128 = i64::MAX as u128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {value:?}")]
    Invalid { value: String },

    #[error("missing unit in duration {value:?}")]
    MissingUnit { value: String },

    #[error("unknown unit {unit:?} in duration {value:?}")]
    UnknownUnit { unit: String, value: String },

    #[error("duration {value:?} overflows")]
    Overflow { value: String },

    #[error("negative duration {value:?} is not representable")]
    Negative { value: String },
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    })
}

pub(crate) fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid {
        value: text.to_string(),
    };

    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = leading_digits(rest);
        let (int_part, after_int) = rest.split_at(int_len);
        let (frac_part, after_frac) = match after_int.strip_prefix('.') {
            Some(tail) => tail.split_at(leading_digits(tail)),
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = after_frac
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_frac.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit {
                value: text.to_string(),
            });
        }
        let (unit, tail) = after_frac.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            value: text.to_string(),
        })?;

        total = total
            .checked_add(component_nanos(int_part, frac_part, scale).ok_or_else(overflow(text))?)
            .filter(|t| *t <= MAX_NANOS)
            .ok_or_else(overflow(text))?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(DurationError::Negative {
            value: text.to_string(),
        });
    }
    // Bounded by MAX_NANOS above.
    Ok(Duration::from_nanos(total as u64))
}

fn overflow(text: &str) -> impl Fn() -> DurationError + '_ {
    move || DurationError::Overflow {
        value: text.to_string(),
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn component_nanos(int_part: &str, frac_part: &str, scale: u128) -> Option<u128> {
    let mut whole: u128 = 0;
    for b in int_part.bytes() {
        whole = whole.checked_mul(10)?.checked_add(u128::from(b - b'0'))?;
        if whole > MAX_NANOS {
            return None;
        }
    }
    let mut nanos = whole.checked_mul(scale)?;

    // Fraction digits past nanosecond precision are dropped.
    let mut place = scale;
    for b in frac_part.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        nanos = nanos.checked_add(u128::from(b - b'0') * place)?;
    }
    Some(nanos)
}
