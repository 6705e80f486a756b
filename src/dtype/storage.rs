//! Mapping between descriptors and Arrow storage types.

use arrow::datatypes::{DataType as ArrowDataType, TimeUnit as ArrowTimeUnit};

use crate::dtype::types::{DataType, TimeUnit};
use crate::error::{Error, Result};

impl From<TimeUnit> for ArrowTimeUnit {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Second => Self::Second,
            TimeUnit::Millisecond => Self::Millisecond,
            TimeUnit::Microsecond => Self::Microsecond,
            TimeUnit::Nanosecond => Self::Nanosecond,
        }
    }
}

impl From<ArrowTimeUnit> for TimeUnit {
    fn from(unit: ArrowTimeUnit) -> Self {
        match unit {
            ArrowTimeUnit::Second => Self::Second,
            ArrowTimeUnit::Millisecond => Self::Millisecond,
            ArrowTimeUnit::Microsecond => Self::Microsecond,
            ArrowTimeUnit::Nanosecond => Self::Nanosecond,
        }
    }
}

/// Storage type used for categorical columns
#[must_use]
pub fn categorical_arrow_type() -> ArrowDataType {
    ArrowDataType::Dictionary(Box::new(ArrowDataType::UInt32), Box::new(ArrowDataType::Utf8))
}

/// Identifies whether an Arrow type stores strings
#[must_use]
pub fn is_string_like(data_type: &ArrowDataType) -> bool {
    match data_type {
        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 | ArrowDataType::Utf8View => true,
        ArrowDataType::Dictionary(_, value_type) => is_string_like(value_type),
        _ => false,
    }
}

impl DataType {
    /// The Arrow type a column of this type is stored as. `Object` has none.
    #[must_use]
    pub fn to_arrow(&self) -> Option<ArrowDataType> {
        let arrow_type = match self {
            Self::Int8 => ArrowDataType::Int8,
            Self::Int16 => ArrowDataType::Int16,
            Self::Int32 => ArrowDataType::Int32,
            Self::Int64 => ArrowDataType::Int64,
            Self::UInt8 => ArrowDataType::UInt8,
            Self::UInt16 => ArrowDataType::UInt16,
            Self::UInt32 => ArrowDataType::UInt32,
            Self::UInt64 => ArrowDataType::UInt64,
            Self::Float32 => ArrowDataType::Float32,
            Self::Float64 => ArrowDataType::Float64,
            Self::Boolean => ArrowDataType::Boolean,
            Self::String => ArrowDataType::Utf8,
            Self::Categorical => categorical_arrow_type(),
            Self::Date => ArrowDataType::Date32,
            Self::Datetime(unit) => ArrowDataType::Timestamp((*unit).into(), None),
            Self::Time => ArrowDataType::Time64(ArrowTimeUnit::Nanosecond),
            Self::Duration(unit) => ArrowDataType::Duration((*unit).into()),
            Self::Decimal { precision, scale } => {
                // scale <= precision <= 38 always fits an i8
                ArrowDataType::Decimal128(*precision, i8::try_from(*scale).ok()?)
            }
            Self::Null => ArrowDataType::Null,
            Self::Object => return None,
        };
        Some(arrow_type)
    }

    /// Resolve the descriptor of a native Arrow storage type
    pub fn from_arrow(data_type: &ArrowDataType) -> Result<Self> {
        let resolved = match data_type {
            ArrowDataType::Int8 => Self::Int8,
            ArrowDataType::Int16 => Self::Int16,
            ArrowDataType::Int32 => Self::Int32,
            ArrowDataType::Int64 => Self::Int64,
            ArrowDataType::UInt8 => Self::UInt8,
            ArrowDataType::UInt16 => Self::UInt16,
            ArrowDataType::UInt32 => Self::UInt32,
            ArrowDataType::UInt64 => Self::UInt64,
            ArrowDataType::Float32 => Self::Float32,
            ArrowDataType::Float64 => Self::Float64,
            ArrowDataType::Boolean => Self::Boolean,
            ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 | ArrowDataType::Utf8View => {
                Self::String
            }
            ArrowDataType::Dictionary(_, value_type) if is_string_like(value_type) => {
                Self::Categorical
            }
            ArrowDataType::Date32 | ArrowDataType::Date64 => Self::Date,
            ArrowDataType::Timestamp(unit, None) => Self::Datetime((*unit).into()),
            ArrowDataType::Time32(_) | ArrowDataType::Time64(_) => Self::Time,
            ArrowDataType::Duration(unit) => Self::Duration((*unit).into()),
            ArrowDataType::Decimal128(precision, scale) => {
                let scale = u8::try_from(*scale).map_err(|_| {
                    Error::UnknownType(format!("decimal with negative scale {scale}"))
                })?;
                Self::decimal(*precision, scale)
                    .map_err(|_| Error::UnknownType(data_type.to_string()))?
            }
            ArrowDataType::Null => Self::Null,
            other => return Err(Error::UnknownType(other.to_string())),
        };
        Ok(resolved)
    }
}
