//! Per-element conversion rules for object values.
//!
//! [`coerce_value`] is the single source of truth for converting one value to
//! a target type. The object path uses it for every element and the typed path
//! uses it for string, temporal and decimal sources, so a mask bit and the
//! executor agree by construction.

use std::fmt::Write;

use chrono::{NaiveTime, TimeDelta};

use crate::coerce::parse::{
    duration_from_count, parse_bool, parse_date_string, parse_datetime, parse_decimal,
    parse_duration, parse_float, parse_integer, parse_time,
};
use crate::coerce::types::ValueError;
use crate::config::CoercionConfig;
use crate::container::temporal::{
    date_to_days, datetime_to_epoch, days_to_date, duration_to_count, epoch_to_datetime,
};
use crate::container::value::Value;
use crate::dtype::{DataType, TimeUnit};

const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// Convert a single value to `target`.
///
/// Nulls always convert to null. On success the value is in the canonical
/// form for the target: `Int`/`UInt` for integers, `Float` for both float
/// widths (already narrowed for `Float32`), `Str` for strings and
/// categoricals, chrono values truncated to the target unit for temporals and
/// `Decimal` at the target scale for decimals.
pub fn coerce_value(
    value: &Value,
    target: &DataType,
    config: &CoercionConfig,
) -> Result<Value, ValueError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match target {
        DataType::Object => Ok(value.clone()),
        DataType::Null => Err(unsupported(value, target)),
        DataType::String | DataType::Categorical => render(value, target, config).map(Value::Str),
        DataType::Boolean => to_bool(value, target).map(Value::Bool),
        DataType::Float32 | DataType::Float64 => to_float(value, target).map(Value::Float),
        DataType::Date => to_date(value, target, config),
        DataType::Datetime(unit) => to_datetime(value, target, *unit, config),
        DataType::Time => to_time(value, target, config),
        DataType::Duration(unit) => to_duration(value, target, *unit),
        DataType::Decimal { precision, scale } => to_decimal(value, target, *precision, *scale),
        integer => to_integer(value, integer),
    }
}

fn unsupported(value: &Value, target: &DataType) -> ValueError {
    ValueError::Unsupported {
        kind: value.kind(),
        value: value.to_string(),
        target: target.clone(),
    }
}

fn unparsable(s: &str, target: &DataType) -> ValueError {
    ValueError::Unparsable {
        value: s.to_string(),
        target: target.clone(),
    }
}

fn out_of_range(value: &Value, target: &DataType) -> ValueError {
    ValueError::OutOfRange {
        value: value.to_string(),
        target: target.clone(),
    }
}

/// String form of a value; dates use the configured output format
fn render(value: &Value, target: &DataType, config: &CoercionConfig) -> Result<String, ValueError> {
    match value {
        Value::Date(date) => {
            let mut rendered = String::new();
            write!(rendered, "{}", date.format(&config.date_format_config.default_format))
                .map_err(|_| unsupported(value, target))?;
            Ok(rendered)
        }
        other => Ok(other.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_integer(value: &Value, target: &DataType) -> Result<Value, ValueError> {
    let Some((min, max)) = target.integer_bounds() else {
        return Err(unsupported(value, target));
    };

    let integer = match value {
        Value::Bool(b) => i128::from(*b),
        Value::Int(_) | Value::UInt(_) => {
            value.as_i128().ok_or_else(|| unsupported(value, target))?
        }
        // Saturating cast; anything saturated fails the range check below
        Value::Float(f) if f.is_finite() => f.trunc() as i128,
        Value::Float(_) => return Err(out_of_range(value, target)),
        Value::Str(s) => parse_integer(s).ok_or_else(|| unparsable(s, target))?,
        // Past 10^38 the divisor exceeds every unscaled value
        Value::Decimal { value: unscaled, scale } => 10_i128
            .checked_pow(u32::from(*scale))
            .map_or(0, |divisor| *unscaled / divisor),
        Value::Date(date) => i128::from(date_to_days(*date)),
        _ => return Err(unsupported(value, target)),
    };

    if integer < min || integer > max {
        return Err(out_of_range(value, target));
    }
    if target.is_unsigned_integer() {
        u64::try_from(integer)
            .map(Value::UInt)
            .map_err(|_| out_of_range(value, target))
    } else {
        i64::try_from(integer)
            .map(Value::Int)
            .map_err(|_| out_of_range(value, target))
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_float(value: &Value, target: &DataType) -> Result<f64, ValueError> {
    let float = match value {
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Int(i) => *i as f64,
        Value::UInt(u) => *u as f64,
        Value::Float(f) => *f,
        Value::Str(s) => parse_float(s).ok_or_else(|| unparsable(s, target))?,
        Value::Decimal { value: unscaled, scale } => {
            *unscaled as f64 / 10_f64.powi(i32::from(*scale))
        }
        _ => return Err(unsupported(value, target)),
    };

    if *target == DataType::Float32 {
        #[allow(clippy::cast_possible_truncation)]
        let narrowed = float as f32;
        if float.is_finite() && narrowed.is_infinite() {
            return Err(ValueError::Overflow {
                value: value.to_string(),
                target: target.clone(),
            });
        }
        return Ok(f64::from(narrowed));
    }
    Ok(float)
}

fn to_bool(value: &Value, target: &DataType) -> Result<bool, ValueError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::UInt(u) => Ok(*u != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Decimal { value: unscaled, .. } => Ok(*unscaled != 0),
        Value::Str(s) => parse_bool(s).ok_or_else(|| unparsable(s, target)),
        _ => Err(unsupported(value, target)),
    }
}

fn to_date(value: &Value, target: &DataType, config: &CoercionConfig) -> Result<Value, ValueError> {
    let date = match value {
        Value::Date(date) => *date,
        Value::Datetime(datetime) => datetime.date(),
        Value::Int(_) | Value::UInt(_) => value
            .as_i128()
            .and_then(|days| i64::try_from(days).ok())
            .and_then(days_to_date)
            .ok_or_else(|| out_of_range(value, target))?,
        Value::Str(s) => parse_date_string(s, &config.date_format_config)
            .ok_or_else(|| unparsable(s, target))?,
        _ => return Err(unsupported(value, target)),
    };
    Ok(Value::Date(date))
}

fn to_datetime(
    value: &Value,
    target: &DataType,
    unit: TimeUnit,
    config: &CoercionConfig,
) -> Result<Value, ValueError> {
    let datetime = match value {
        Value::Datetime(datetime) => *datetime,
        Value::Date(date) => date.and_time(NaiveTime::MIN),
        Value::Int(_) | Value::UInt(_) => value
            .as_i128()
            .and_then(|ticks| i64::try_from(ticks).ok())
            .and_then(|ticks| epoch_to_datetime(ticks, unit))
            .ok_or_else(|| out_of_range(value, target))?,
        Value::Str(s) => parse_datetime(s, config).ok_or_else(|| unparsable(s, target))?,
        _ => return Err(unsupported(value, target)),
    };

    // Round trip through the target unit so the value matches what storage keeps
    datetime_to_epoch(datetime, unit)
        .and_then(|ticks| epoch_to_datetime(ticks, unit))
        .map(Value::Datetime)
        .ok_or_else(|| out_of_range(value, target))
}

fn to_time(value: &Value, target: &DataType, config: &CoercionConfig) -> Result<Value, ValueError> {
    let time = match value {
        Value::Time(time) => *time,
        Value::Datetime(datetime) => datetime.time(),
        Value::Int(_) | Value::UInt(_) => value
            .as_i128()
            .and_then(|nanos| i64::try_from(nanos).ok())
            .filter(|nanos| (0..NANOS_PER_DAY).contains(nanos))
            .and_then(|nanos| {
                let seconds = u32::try_from(nanos / 1_000_000_000).ok()?;
                let subsec = u32::try_from(nanos % 1_000_000_000).ok()?;
                NaiveTime::from_num_seconds_from_midnight_opt(seconds, subsec)
            })
            .ok_or_else(|| out_of_range(value, target))?,
        Value::Str(s) => parse_time(s, config).ok_or_else(|| unparsable(s, target))?,
        _ => return Err(unsupported(value, target)),
    };
    Ok(Value::Time(time))
}

fn to_duration(value: &Value, target: &DataType, unit: TimeUnit) -> Result<Value, ValueError> {
    let duration: TimeDelta = match value {
        Value::Duration(duration) => *duration,
        Value::Int(_) | Value::UInt(_) => value
            .as_i128()
            .and_then(|count| i64::try_from(count).ok())
            .and_then(|count| duration_from_count(count, unit))
            .ok_or_else(|| out_of_range(value, target))?,
        Value::Str(s) => parse_duration(s, unit).ok_or_else(|| unparsable(s, target))?,
        _ => return Err(unsupported(value, target)),
    };

    duration_to_count(duration, unit)
        .and_then(|count| duration_from_count(count, unit))
        .map(Value::Duration)
        .ok_or_else(|| out_of_range(value, target))
}

#[allow(clippy::cast_possible_truncation)]
fn to_decimal(
    value: &Value,
    target: &DataType,
    precision: u8,
    scale: u8,
) -> Result<Value, ValueError> {
    let factor = 10_i128
        .checked_pow(u32::from(scale))
        .ok_or_else(|| out_of_range(value, target))?;
    let unscaled = match value {
        Value::Bool(b) => i128::from(*b) * factor,
        Value::Int(_) | Value::UInt(_) => value
            .as_i128()
            .and_then(|i| i.checked_mul(factor))
            .ok_or_else(|| out_of_range(value, target))?,
        Value::Float(f) => {
            let scaled = (f * 10_f64.powi(i32::from(scale))).round();
            if !scaled.is_finite() || scaled.abs() >= 1e38 {
                return Err(out_of_range(value, target));
            }
            scaled as i128
        }
        Value::Str(s) => parse_decimal(s, scale).ok_or_else(|| unparsable(s, target))?,
        Value::Decimal {
            value: unscaled,
            scale: source_scale,
        } => rescale(*unscaled, *source_scale, scale).ok_or_else(|| ValueError::Lossy {
            value: value.to_string(),
            target: target.clone(),
        })?,
        _ => return Err(unsupported(value, target)),
    };

    let limit = 10_i128
        .checked_pow(u32::from(precision))
        .ok_or_else(|| out_of_range(value, target))?;
    if unscaled.abs() >= limit {
        return Err(out_of_range(value, target));
    }
    Ok(Value::Decimal {
        value: unscaled,
        scale,
    })
}

/// Move an unscaled decimal between scales without losing digits
fn rescale(unscaled: i128, from: u8, to: u8) -> Option<i128> {
    if from <= to {
        unscaled.checked_mul(10_i128.checked_pow(u32::from(to - from))?)
    } else {
        match 10_i128.checked_pow(u32::from(from - to)) {
            Some(divisor) => (unscaled % divisor == 0).then_some(unscaled / divisor),
            None => (unscaled == 0).then_some(0),
        }
    }
}
