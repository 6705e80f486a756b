//! Canonical type descriptors and the equivalence relation between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest precision a 128-bit decimal can hold
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Resolution of datetime and duration types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    /// Short suffix used in type names and duration literals
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Millisecond => "ms",
            Self::Microsecond => "us",
            Self::Nanosecond => "ns",
        }
    }

    /// Parse a unit suffix such as `ms`
    #[must_use]
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "s" => Some(Self::Second),
            "ms" => Some(Self::Millisecond),
            "us" | "µs" => Some(Self::Microsecond),
            "ns" => Some(Self::Nanosecond),
            _ => None,
        }
    }
}

/// A concrete logical data type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    String,
    Categorical,
    Date,
    Datetime(TimeUnit),
    Time,
    Duration(TimeUnit),
    Decimal { precision: u8, scale: u8 },
    Null,
    /// Heterogeneous values with no uniform storage type
    Object,
}

impl DataType {
    /// Build a decimal type, validating precision and scale
    pub fn decimal(precision: u8, scale: u8) -> Result<Self> {
        if precision == 0 || precision > MAX_DECIMAL_PRECISION {
            return Err(Error::InvalidContainer(format!(
                "decimal precision must be between 1 and {MAX_DECIMAL_PRECISION}, got {precision}"
            )));
        }
        if scale > precision {
            return Err(Error::InvalidContainer(format!(
                "decimal scale {scale} exceeds precision {precision}"
            )));
        }
        Ok(Self::Decimal { precision, scale })
    }

    #[must_use]
    pub const fn is_signed_integer(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    #[must_use]
    pub const fn is_unsigned_integer(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    #[must_use]
    pub const fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Integers, floats and decimals
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_decimal()
    }

    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::Datetime(_) | Self::Time | Self::Duration(_)
        )
    }

    #[must_use]
    pub const fn is_decimal(&self) -> bool {
        matches!(self, Self::Decimal { .. })
    }

    /// Inclusive value range of an integer type
    #[must_use]
    pub const fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::UInt8 => Some((0, u8::MAX as i128)),
            Self::UInt16 => Some((0, u16::MAX as i128)),
            Self::UInt32 => Some((0, u32::MAX as i128)),
            Self::UInt64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datetime(unit) => write!(f, "Datetime[{}]", unit.suffix()),
            Self::Duration(unit) => write!(f, "Duration[{}]", unit.suffix()),
            Self::Decimal { precision, scale } => write!(f, "Decimal({precision}, {scale})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// An abstract category of concrete types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeGroup {
    Integer,
    SignedInteger,
    UnsignedInteger,
    Float,
    /// Integers, floats and decimals
    Numeric,
    /// Dates, datetimes, times and durations
    Temporal,
}

impl TypeGroup {
    /// Whether a concrete type is a member of this group
    #[must_use]
    pub const fn contains(self, data_type: &DataType) -> bool {
        match self {
            Self::Integer => data_type.is_integer(),
            Self::SignedInteger => data_type.is_signed_integer(),
            Self::UnsignedInteger => data_type.is_unsigned_integer(),
            Self::Float => data_type.is_float(),
            Self::Numeric => data_type.is_numeric(),
            Self::Temporal => data_type.is_temporal(),
        }
    }

    /// Whether every member of `other` is also a member of this group
    #[must_use]
    pub const fn includes(self, other: Self) -> bool {
        match (self, other) {
            (Self::Integer, Self::Integer | Self::SignedInteger | Self::UnsignedInteger)
            | (Self::SignedInteger, Self::SignedInteger)
            | (Self::UnsignedInteger, Self::UnsignedInteger)
            | (Self::Float, Self::Float)
            | (Self::Temporal, Self::Temporal)
            | (
                Self::Numeric,
                Self::Numeric
                | Self::Integer
                | Self::SignedInteger
                | Self::UnsignedInteger
                | Self::Float,
            ) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::SignedInteger => "signed_integer",
            Self::UnsignedInteger => "unsigned_integer",
            Self::Float => "floating",
            Self::Numeric => "numeric",
            Self::Temporal => "temporal",
        };
        f.write_str(name)
    }
}

/// A resolved type descriptor: either a concrete type or an abstract group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dtype {
    Concrete(DataType),
    Group(TypeGroup),
}

impl Dtype {
    /// The concrete type, if this descriptor is not abstract
    #[must_use]
    pub const fn concrete(&self) -> Option<&DataType> {
        match self {
            Self::Concrete(data_type) => Some(data_type),
            Self::Group(_) => None,
        }
    }

    /// Whether `other` satisfies this descriptor when this one is the requested type
    #[must_use]
    pub fn check(&self, other: &Self) -> bool {
        satisfies(self, other)
    }
}

impl From<DataType> for Dtype {
    fn from(data_type: DataType) -> Self {
        Self::Concrete(data_type)
    }
}

impl From<TypeGroup> for Dtype {
    fn from(group: TypeGroup) -> Self {
        Self::Group(group)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(data_type) => data_type.fmt(f),
            Self::Group(group) => group.fmt(f),
        }
    }
}

/// Asymmetric equivalence: does `actual` fulfil a request for `requested`?
///
/// A concrete request only accepts the identical concrete type. An abstract
/// request accepts any member of its group, or a narrower group. A concrete
/// type never satisfies itself as a request for a group in reverse, and
/// `Object` belongs to no group.
#[must_use]
pub fn satisfies(requested: &Dtype, actual: &Dtype) -> bool {
    match (requested, actual) {
        (Dtype::Concrete(requested), Dtype::Concrete(actual)) => requested == actual,
        (Dtype::Group(group), Dtype::Concrete(actual)) => group.contains(actual),
        (Dtype::Group(group), Dtype::Group(other)) => group.includes(*other),
        (Dtype::Concrete(_), Dtype::Group(_)) => false,
    }
}
