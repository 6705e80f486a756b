//! Canonical string parsers.
//!
//! Every string conversion goes through these functions, whether it is being
//! predicted by the evaluator or performed by the executor. Keeping a single
//! parser per target is what makes a mask bit a reliable prediction of the
//! conversion outcome.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::coerce::types::DateFormatConfig;
use crate::config::CoercionConfig;
use crate::dtype::TimeUnit;

/// Parse a boolean literal.
///
/// Accepts `true`/`True`/`TRUE`/`1` and `false`/`False`/`FALSE`/`0`. Other
/// spellings (`yes`, `t`, `on`, mixed case) are rejected.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" | "1" => Some(true),
        "false" | "False" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an integer literal: optional sign followed by ASCII digits
#[must_use]
pub fn parse_integer(s: &str) -> Option<i128> {
    s.parse::<i128>().ok()
}

/// Parse a float literal, including `inf` and `NaN`
#[must_use]
pub fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    config
        .date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| {
            if !config.enable_format_detection {
                return None;
            }
            detect_date_format(s).and_then(|format| NaiveDate::parse_from_str(s, format).ok())
        })
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    let bytes = s.as_bytes();

    // YYYY-MM-DD
    if bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-' {
        return Some("%Y-%m-%d");
    }

    if let [first, _, last] = s.split('/').collect::<Vec<_>>()[..] {
        if first.len() == 4 {
            return Some("%Y/%m/%d");
        }
        // Day-first unless the first part cannot be a day
        if last.len() == 4 && first.parse::<u8>().is_ok() {
            return Some("%d/%m/%Y");
        }
    }

    if let [_, _, last] = s.split('.').collect::<Vec<_>>()[..] {
        if last.len() == 4 {
            return Some("%d.%m.%Y");
        }
    }

    // YYYYMMDD
    if bytes.len() == 8 && bytes.iter().all(u8::is_ascii_digit) {
        return Some("%Y%m%d");
    }

    None
}

/// Parse a datetime; a bare date is read as midnight
#[must_use]
pub fn parse_datetime(s: &str, config: &CoercionConfig) -> Option<NaiveDateTime> {
    config
        .datetime_formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            parse_date_string(s, &config.date_format_config)
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Parse a time of day
#[must_use]
pub fn parse_time(s: &str, config: &CoercionConfig) -> Option<NaiveTime> {
    config
        .time_formats
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
}

/// Parse a duration: an integer with an optional unit suffix.
///
/// Suffixes are `ns`, `us`, `ms`, `s`, `m`, `h` and `d`. A bare integer is
/// read in `default_unit`.
#[must_use]
pub fn parse_duration(s: &str, default_unit: TimeUnit) -> Option<TimeDelta> {
    let split = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map_or(s.len(), |(i, _)| i);
    let (number, suffix) = s.split_at(split);
    let count = number.parse::<i64>().ok()?;

    match suffix {
        "" => duration_from_count(count, default_unit),
        "m" => TimeDelta::try_minutes(count),
        "h" => TimeDelta::try_hours(count),
        "d" => TimeDelta::try_days(count),
        other => duration_from_count(count, TimeUnit::from_suffix(other)?),
    }
}

/// A duration of `count` ticks of `unit`
#[must_use]
pub fn duration_from_count(count: i64, unit: TimeUnit) -> Option<TimeDelta> {
    match unit {
        TimeUnit::Second => TimeDelta::try_seconds(count),
        TimeUnit::Millisecond => TimeDelta::try_milliseconds(count),
        TimeUnit::Microsecond => Some(TimeDelta::microseconds(count)),
        TimeUnit::Nanosecond => Some(TimeDelta::nanoseconds(count)),
    }
}

/// Parse a decimal literal into an unscaled integer at `scale`.
///
/// Fractional digits beyond `scale` must be zeros; anything else would lose
/// information and is rejected.
#[must_use]
pub fn parse_decimal(s: &str, scale: u8) -> Option<i128> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let scale = usize::from(scale);
    let (kept, dropped) = frac_part.split_at(frac_part.len().min(scale));
    if dropped.bytes().any(|b| b != b'0') {
        return None;
    }

    let mut value: i128 = 0;
    for b in int_part.bytes().chain(kept.bytes()) {
        value = value.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }
    let padding = u32::try_from(scale - kept.len()).ok()?;
    value = value.checked_mul(10_i128.checked_pow(padding)?)?;

    Some(if negative { -value } else { value })
}
