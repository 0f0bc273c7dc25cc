//! Count and duration normalization.
//!
//! Upstream pages abbreviate large counts with a magnitude suffix: the CJK
//! units 万 (10⁴) and 亿 (10⁸), or Latin `K`/`M`/`B`. Parsing is exact
//! decimal arithmetic so `1.2万` is always `12000`. Formatting goes the other
//! way with one decimal place, so `format → parse → format` is stable but
//! `parse → format → parse` loses precision.

use crate::error::ParseError;

const TEN_THOUSAND: u128 = 10_000;
const HUNDRED_MILLION: u128 = 100_000_000;

/// Longest fractional part that can still matter for the largest multiplier.
const MAX_FRACTION_DIGITS: usize = 9;

/// Parses a count such as `"1234"`, `"1,234 views"`, `"1.2万"`, `"3.5亿"`, or
/// `"1.2M subscribers"` into an integer.
///
/// Only a unit directly after the number counts; text further along is
/// ignored. `"1亿2000万"` reads as `1亿 + 2000万`. A plain number with a
/// fractional part is truncated.
///
/// # Errors
///
/// Returns [`ParseError::NoDigits`] when `text` contains no digits and
/// [`ParseError::Overflow`] when the value does not fit in `u64`.
pub fn parse_magnitude(text: &str) -> Result<u64, ParseError> {
    let trimmed = text.trim();
    let start = trimmed
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ParseError::NoDigits(text.to_owned()))?;
    let rest = &trimmed[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(rest.len());
    let number: String = rest[..end].chars().filter(|c| *c != ',').collect();
    let (multiplier, after_unit) = suffix_multiplier(&rest[end..]);

    let (int_part, frac_part) = number.split_once('.').unwrap_or((&number, ""));
    let frac_digits: String = frac_part
        .chars()
        .take_while(char::is_ascii_digit)
        .take(MAX_FRACTION_DIGITS)
        .collect();

    let overflow = || ParseError::Overflow(text.to_owned());
    let int_value: u128 = int_part.parse().map_err(|_| overflow())?;
    let mut value = int_value.checked_mul(multiplier).ok_or_else(overflow)?;

    if multiplier > 1 && !frac_digits.is_empty() {
        let frac_value: u128 = frac_digits.parse().map_err(|_| overflow())?;
        let scale = 10u128.pow(u32::try_from(frac_digits.len()).map_err(|_| overflow())?);
        value = value
            .checked_add(frac_value * multiplier / scale)
            .ok_or_else(overflow)?;
    }

    if multiplier == HUNDRED_MILLION && after_unit.starts_with(|c: char| c.is_ascii_digit()) {
        let remainder = u128::from(parse_magnitude(after_unit)?);
        if remainder < HUNDRED_MILLION {
            value = value.checked_add(remainder).ok_or_else(overflow)?;
        }
    }

    u64::try_from(value).map_err(|_| overflow())
}

/// Multiplier for the unit right after the number, plus the text after a
/// CJK unit.
fn suffix_multiplier(tail: &str) -> (u128, &str) {
    let tail = tail.trim_start();
    let mut chars = tail.chars();
    let Some(unit) = chars.next() else {
        return (1, "");
    };
    match unit {
        '万' => return (TEN_THOUSAND, chars.as_str()),
        '亿' => return (HUNDRED_MILLION, chars.as_str()),
        _ => {}
    }
    // "5 billion" or "3 months" must not read as a suffix.
    if chars.next().is_some_and(char::is_alphabetic) {
        return (1, "");
    }
    let multiplier = match unit {
        'K' | 'k' => 1_000,
        'M' | 'm' => 1_000_000,
        'B' | 'b' => 1_000_000_000,
        _ => 1,
    };
    (multiplier, "")
}

/// Abbreviates a count with the CJK magnitude units, one decimal place.
///
/// `123_456_789` → `"1.2亿"`, `12_345` → `"1.2万"`, `999` → `"999"`.
///
/// Rounds half up. A value that rounds to `10000.0万` is shown as `1.0亿`.
#[must_use]
pub fn format_magnitude(count: u64) -> String {
    let count = u128::from(count);
    let tenths_of = |unit: u128| (count + unit / 20) / (unit / 10);
    let wan_tenths = tenths_of(TEN_THOUSAND);
    if count >= HUNDRED_MILLION || wan_tenths >= TEN_THOUSAND * 10 {
        let yi_tenths = tenths_of(HUNDRED_MILLION);
        format!("{}.{}亿", yi_tenths / 10, yi_tenths % 10)
    } else if count >= TEN_THOUSAND {
        format!("{}.{}万", wan_tenths / 10, wan_tenths % 10)
    } else {
        count.to_string()
    }
}

/// Renders seconds as `H:MM:SS` when there is at least one hour, else `M:SS`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
