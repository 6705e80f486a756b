//! Dynamically typed scalars held by object columns.

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Date32Array, Date32Builder, Date64Array,
    Decimal128Array, Decimal128Builder, DurationMicrosecondArray, DurationMicrosecondBuilder,
    DurationMillisecondArray, DurationMillisecondBuilder, DurationNanosecondArray,
    DurationNanosecondBuilder, DurationSecondArray, DurationSecondBuilder, Float32Array,
    Float32Builder, Float64Array, Float64Builder, Int8Array, Int8Builder, Int16Array,
    Int16Builder, Int32Array, Int32Builder, Int64Array, Int64Builder, LargeStringArray,
    StringArray, StringBuilder, StringViewArray, Time32MillisecondArray, Time32SecondArray,
    Time64MicrosecondArray, Time64NanosecondArray, Time64NanosecondBuilder,
    TimestampMicrosecondArray, TimestampMicrosecondBuilder, TimestampMillisecondArray,
    TimestampMillisecondBuilder, TimestampNanosecondArray, TimestampNanosecondBuilder,
    TimestampSecondArray, TimestampSecondBuilder, UInt8Array, UInt8Builder, UInt16Array,
    UInt16Builder, UInt32Array, UInt32Builder, UInt64Array, UInt64Builder, new_null_array,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType as ArrowDataType, TimeUnit as ArrowTimeUnit};
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::container::temporal::{
    date_to_days, datetime_to_epoch, duration_to_count, time_to_nanos,
};
use crate::dtype::{DataType, TimeUnit, categorical_arrow_type};
use crate::error::{Error, Result};

/// A single dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Datetime(NaiveDateTime),
    Time(NaiveTime),
    Duration(TimeDelta),
    /// Unscaled integer with the number of fractional digits
    Decimal { value: i128, scale: u8 },
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the value's kind, for error messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "signed integer",
            Self::UInt(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Date(_) => "date",
            Self::Datetime(_) => "datetime",
            Self::Time(_) => "time",
            Self::Duration(_) => "duration",
            Self::Decimal { .. } => "decimal",
        }
    }

    /// Integer value of an integer variant
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(*v)),
            Self::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Read the value at `index` of an Arrow array
    ///
    /// Types without a dedicated variant fall back to their display string.
    #[must_use]
    pub fn from_array(array: &dyn Array, index: usize) -> Self {
        if array.is_null(index) {
            return Self::Null;
        }
        extract(array, index).unwrap_or_else(|| {
            array_value_to_string(array, index).map_or(Self::Null, Self::Str)
        })
    }

    /// Read every value of an Arrow array
    #[must_use]
    pub fn from_array_all(array: &dyn Array) -> Vec<Self> {
        (0..array.len())
            .map(|index| Self::from_array(array, index))
            .collect()
    }
}

fn extract(array: &dyn Array, index: usize) -> Option<Value> {
    macro_rules! native {
        ($array_type:ty) => {
            array.as_any().downcast_ref::<$array_type>()?.value(index)
        };
    }
    macro_rules! temporal {
        ($array_type:ty, $accessor:ident) => {
            array.as_any().downcast_ref::<$array_type>()?.$accessor(index)?
        };
    }

    let value = match array.data_type() {
        ArrowDataType::Boolean => Value::Bool(native!(BooleanArray)),
        ArrowDataType::Int8 => Value::Int(i64::from(native!(Int8Array))),
        ArrowDataType::Int16 => Value::Int(i64::from(native!(Int16Array))),
        ArrowDataType::Int32 => Value::Int(i64::from(native!(Int32Array))),
        ArrowDataType::Int64 => Value::Int(native!(Int64Array)),
        ArrowDataType::UInt8 => Value::UInt(u64::from(native!(UInt8Array))),
        ArrowDataType::UInt16 => Value::UInt(u64::from(native!(UInt16Array))),
        ArrowDataType::UInt32 => Value::UInt(u64::from(native!(UInt32Array))),
        ArrowDataType::UInt64 => Value::UInt(native!(UInt64Array)),
        ArrowDataType::Float32 => Value::Float(f64::from(native!(Float32Array))),
        ArrowDataType::Float64 => Value::Float(native!(Float64Array)),
        ArrowDataType::Utf8 => Value::Str(native!(StringArray).to_string()),
        ArrowDataType::LargeUtf8 => Value::Str(native!(LargeStringArray).to_string()),
        ArrowDataType::Utf8View => Value::Str(native!(StringViewArray).to_string()),
        ArrowDataType::Date32 => Value::Date(temporal!(Date32Array, value_as_date)),
        ArrowDataType::Date64 => Value::Date(temporal!(Date64Array, value_as_date)),
        ArrowDataType::Timestamp(unit, None) => Value::Datetime(match unit {
            ArrowTimeUnit::Second => temporal!(TimestampSecondArray, value_as_datetime),
            ArrowTimeUnit::Millisecond => temporal!(TimestampMillisecondArray, value_as_datetime),
            ArrowTimeUnit::Microsecond => temporal!(TimestampMicrosecondArray, value_as_datetime),
            ArrowTimeUnit::Nanosecond => temporal!(TimestampNanosecondArray, value_as_datetime),
        }),
        ArrowDataType::Time32(ArrowTimeUnit::Second) => {
            Value::Time(temporal!(Time32SecondArray, value_as_time))
        }
        ArrowDataType::Time32(ArrowTimeUnit::Millisecond) => {
            Value::Time(temporal!(Time32MillisecondArray, value_as_time))
        }
        ArrowDataType::Time64(ArrowTimeUnit::Microsecond) => {
            Value::Time(temporal!(Time64MicrosecondArray, value_as_time))
        }
        ArrowDataType::Time64(ArrowTimeUnit::Nanosecond) => {
            Value::Time(temporal!(Time64NanosecondArray, value_as_time))
        }
        ArrowDataType::Duration(unit) => Value::Duration(match unit {
            ArrowTimeUnit::Second => temporal!(DurationSecondArray, value_as_duration),
            ArrowTimeUnit::Millisecond => temporal!(DurationMillisecondArray, value_as_duration),
            ArrowTimeUnit::Microsecond => temporal!(DurationMicrosecondArray, value_as_duration),
            ArrowTimeUnit::Nanosecond => temporal!(DurationNanosecondArray, value_as_duration),
        }),
        ArrowDataType::Decimal128(_, scale) => Value::Decimal {
            value: native!(Decimal128Array),
            scale: u8::try_from(*scale).ok()?,
        },
        _ => return None,
    };
    Some(value)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Datetime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Time(v) => write!(f, "{}", v.format("%H:%M:%S%.f")),
            Self::Duration(v) => match v.num_nanoseconds() {
                Some(nanos) => write!(f, "{nanos}ns"),
                None => write!(f, "{}s", v.num_seconds()),
            },
            Self::Decimal { value, scale } => {
                if *scale == 0 {
                    return write!(f, "{value}");
                }
                let sign = if *value < 0 { "-" } else { "" };
                let magnitude = value.unsigned_abs();
                // Scales past 38 leave every digit in the fraction
                let (whole, fraction) = 10_u128
                    .checked_pow(u32::from(*scale))
                    .map_or((0, magnitude), |divisor| (magnitude / divisor, magnitude % divisor));
                write!(f, "{sign}{whole}.{fraction:0width$}", width = usize::from(*scale))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Datetime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Build an Arrow array of `target` from values already converted to it.
///
/// Values must be in the canonical form [`coerce_value`] produces for the
/// target; anything else is reported as a coercion error.
///
/// [`coerce_value`]: crate::coerce::value::coerce_value
pub(crate) fn values_to_array(values: &[Value], target: &DataType) -> Result<ArrayRef> {
    let mismatch = |value: &Value| {
        Error::coercion(
            target,
            None,
            format!("{} value {value} is not a {target}", value.kind()),
        )
    };

    macro_rules! build {
        ($builder:expr, $extract:expr) => {{
            let mut builder = $builder;
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    other => builder.append_value($extract(other).ok_or_else(|| mismatch(other))?),
                }
            }
            Arc::new(builder.finish()) as ArrayRef
        }};
    }

    let integer = |value: &Value| value.as_i128();
    let float = |value: &Value| match value {
        Value::Float(v) => Some(*v),
        _ => None,
    };
    let datetime = |value: &Value, unit: TimeUnit| match value {
        Value::Datetime(v) => datetime_to_epoch(*v, unit),
        _ => None,
    };
    let duration = |value: &Value, unit: TimeUnit| match value {
        Value::Duration(v) => duration_to_count(*v, unit),
        _ => None,
    };

    let n = values.len();
    let array = match target {
        DataType::Int8 => build!(Int8Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| i8::try_from(i).ok())),
        DataType::Int16 => build!(Int16Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| i16::try_from(i).ok())),
        DataType::Int32 => build!(Int32Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| i32::try_from(i).ok())),
        DataType::Int64 => build!(Int64Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| i64::try_from(i).ok())),
        DataType::UInt8 => build!(UInt8Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| u8::try_from(i).ok())),
        DataType::UInt16 => build!(UInt16Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| u16::try_from(i).ok())),
        DataType::UInt32 => build!(UInt32Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| u32::try_from(i).ok())),
        DataType::UInt64 => build!(UInt64Builder::with_capacity(n), |v| integer(v)
            .and_then(|i| u64::try_from(i).ok())),
        #[allow(clippy::cast_possible_truncation)]
        DataType::Float32 => build!(Float32Builder::with_capacity(n), |v| float(v)
            .map(|f| f as f32)),
        DataType::Float64 => build!(Float64Builder::with_capacity(n), float),
        DataType::Boolean => build!(BooleanBuilder::with_capacity(n), |v: &Value| match v {
            Value::Bool(b) => Some(*b),
            _ => None,
        }),
        DataType::String | DataType::Categorical => {
            let mut builder = StringBuilder::with_capacity(n, n * 8);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Str(s) => builder.append_value(s),
                    other => return Err(mismatch(other)),
                }
            }
            let strings = Arc::new(builder.finish()) as ArrayRef;
            if *target == DataType::Categorical {
                cast(&strings, &categorical_arrow_type())?
            } else {
                strings
            }
        }
        DataType::Date => build!(Date32Builder::with_capacity(n), |v: &Value| match v {
            Value::Date(d) => Some(date_to_days(*d)),
            _ => None,
        }),
        DataType::Datetime(unit) => match unit {
            TimeUnit::Second => build!(TimestampSecondBuilder::with_capacity(n), |v| datetime(
                v, *unit
            )),
            TimeUnit::Millisecond => {
                build!(TimestampMillisecondBuilder::with_capacity(n), |v| datetime(
                    v, *unit
                ))
            }
            TimeUnit::Microsecond => {
                build!(TimestampMicrosecondBuilder::with_capacity(n), |v| datetime(
                    v, *unit
                ))
            }
            TimeUnit::Nanosecond => {
                build!(TimestampNanosecondBuilder::with_capacity(n), |v| datetime(
                    v, *unit
                ))
            }
        },
        DataType::Time => build!(Time64NanosecondBuilder::with_capacity(n), |v: &Value| match v {
            Value::Time(t) => Some(time_to_nanos(*t)),
            _ => None,
        }),
        DataType::Duration(unit) => match unit {
            TimeUnit::Second => build!(DurationSecondBuilder::with_capacity(n), |v| duration(
                v, *unit
            )),
            TimeUnit::Millisecond => {
                build!(DurationMillisecondBuilder::with_capacity(n), |v| duration(
                    v, *unit
                ))
            }
            TimeUnit::Microsecond => {
                build!(DurationMicrosecondBuilder::with_capacity(n), |v| duration(
                    v, *unit
                ))
            }
            TimeUnit::Nanosecond => {
                build!(DurationNanosecondBuilder::with_capacity(n), |v| duration(
                    v, *unit
                ))
            }
        },
        DataType::Decimal { precision, scale } => {
            let arrow_scale = i8::try_from(*scale)
                .map_err(|_| Error::InvalidContainer(format!("decimal scale {scale} too large")))?;
            build!(
                Decimal128Builder::with_capacity(n)
                    .with_precision_and_scale(*precision, arrow_scale)?,
                |v: &Value| match v {
                    Value::Decimal { value, scale: s } if s == scale => Some(*value),
                    _ => None,
                }
            )
        }
        DataType::Null => {
            if let Some(other) = values.iter().find(|v| !v.is_null()) {
                return Err(mismatch(other));
            }
            new_null_array(&ArrowDataType::Null, n)
        }
        DataType::Object => {
            return Err(Error::InvalidContainer(
                "object values have no Arrow storage type".to_string(),
            ));
        }
    };
    Ok(array)
}
