//! Resolution of type indicators into descriptors.
//!
//! The default registry is built on first use and never mutated afterwards, so
//! concurrent readers need no locking.

use std::sync::LazyLock;

use arrow::datatypes::DataType as ArrowDataType;
use rustc_hash::FxHashMap;

use crate::dtype::types::{DataType, Dtype, TimeUnit, TypeGroup};
use crate::error::{Error, Result};

/// Precision and scale used for a bare `decimal` alias
pub const DEFAULT_DECIMAL: (u8, u8) = (38, 9);

static DEFAULT_REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::new);

/// Anything that can name a type
#[derive(Debug, Clone)]
pub enum TypeIndicator<'a> {
    /// A user-facing alias such as `"int64"` or `"datetime[ms]"`
    Alias(&'a str),
    /// The native type tag of an Arrow container
    Arrow(&'a ArrowDataType),
    /// An already resolved descriptor
    Dtype(Dtype),
}

impl<'a> From<&'a str> for TypeIndicator<'a> {
    fn from(alias: &'a str) -> Self {
        Self::Alias(alias)
    }
}

impl<'a> From<&'a ArrowDataType> for TypeIndicator<'a> {
    fn from(data_type: &'a ArrowDataType) -> Self {
        Self::Arrow(data_type)
    }
}

impl From<DataType> for TypeIndicator<'_> {
    fn from(data_type: DataType) -> Self {
        Self::Dtype(Dtype::Concrete(data_type))
    }
}

impl From<TypeGroup> for TypeIndicator<'_> {
    fn from(group: TypeGroup) -> Self {
        Self::Dtype(Dtype::Group(group))
    }
}

impl From<Dtype> for TypeIndicator<'_> {
    fn from(dtype: Dtype) -> Self {
        Self::Dtype(dtype)
    }
}

/// A table of aliases mapping to descriptors
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    aliases: FxHashMap<String, Dtype>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry with the built-in aliases
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            aliases: FxHashMap::default(),
        };

        let concrete: &[(&[&str], DataType)] = &[
            (&["int8", "i8"], DataType::Int8),
            (&["int16", "i16"], DataType::Int16),
            (&["int32", "i32"], DataType::Int32),
            (&["int64", "i64", "int"], DataType::Int64),
            (&["uint8", "u8"], DataType::UInt8),
            (&["uint16", "u16"], DataType::UInt16),
            (&["uint32", "u32"], DataType::UInt32),
            (&["uint64", "u64"], DataType::UInt64),
            (&["float32", "f32"], DataType::Float32),
            (&["float64", "f64", "float", "double"], DataType::Float64),
            (&["bool", "boolean"], DataType::Boolean),
            (&["str", "string", "utf8"], DataType::String),
            (&["categorical", "category"], DataType::Categorical),
            (&["date"], DataType::Date),
            (&["datetime", "timestamp"], DataType::Datetime(TimeUnit::Microsecond)),
            (&["time"], DataType::Time),
            (&["duration", "timedelta"], DataType::Duration(TimeUnit::Microsecond)),
            (
                &["decimal"],
                DataType::Decimal {
                    precision: DEFAULT_DECIMAL.0,
                    scale: DEFAULT_DECIMAL.1,
                },
            ),
            (&["null"], DataType::Null),
            (&["object"], DataType::Object),
        ];
        for (aliases, data_type) in concrete {
            for alias in *aliases {
                registry.register_alias(alias, Dtype::Concrete(data_type.clone()));
            }
        }

        for group in [
            TypeGroup::Integer,
            TypeGroup::SignedInteger,
            TypeGroup::UnsignedInteger,
            TypeGroup::Float,
            TypeGroup::Numeric,
            TypeGroup::Temporal,
        ] {
            registry.register_alias(&group.to_string(), Dtype::Group(group));
        }

        registry
    }

    /// Register (or replace) an alias. Aliases are matched case-insensitively.
    pub fn register_alias(&mut self, alias: &str, dtype: Dtype) {
        self.aliases.insert(normalize(alias), dtype);
    }

    /// Resolve an indicator into a descriptor
    pub fn resolve<'a>(&self, indicator: impl Into<TypeIndicator<'a>>) -> Result<Dtype> {
        let resolved = match indicator.into() {
            TypeIndicator::Dtype(dtype) => dtype,
            TypeIndicator::Arrow(data_type) => Dtype::Concrete(DataType::from_arrow(data_type)?),
            TypeIndicator::Alias(alias) => self.resolve_alias(alias)?,
        };
        log::trace!("Resolved type indicator to {resolved}");
        Ok(resolved)
    }

    /// Resolve an indicator that must name a concrete type
    pub fn resolve_concrete<'a>(
        &self,
        indicator: impl Into<TypeIndicator<'a>>,
    ) -> Result<DataType> {
        match self.resolve(indicator)? {
            Dtype::Concrete(data_type) => Ok(data_type),
            Dtype::Group(group) => Err(Error::UnknownType(format!(
                "'{group}' is an abstract type group, not a concrete type"
            ))),
        }
    }

    fn resolve_alias(&self, alias: &str) -> Result<Dtype> {
        let key = normalize(alias);
        if let Some(dtype) = self.aliases.get(&key) {
            return Ok(dtype.clone());
        }
        parse_parameterized(&key)
            .map(Dtype::Concrete)
            .ok_or_else(|| Error::UnknownType(alias.to_string()))
    }
}

fn normalize(alias: &str) -> String {
    alias.trim().to_lowercase()
}

/// Parse `datetime[ms]`, `duration[ns]` and `decimal(10, 2)` style aliases
fn parse_parameterized(key: &str) -> Option<DataType> {
    if let Some(unit) = bracketed(key, "datetime").or_else(|| bracketed(key, "timestamp")) {
        return TimeUnit::from_suffix(unit).map(DataType::Datetime);
    }
    if let Some(unit) = bracketed(key, "duration").or_else(|| bracketed(key, "timedelta")) {
        return TimeUnit::from_suffix(unit).map(DataType::Duration);
    }

    let params = key.strip_prefix("decimal")?.trim();
    let params = params.strip_prefix('(')?.strip_suffix(')')?;
    let (precision, scale) = match params.split_once(',') {
        Some((precision, scale)) => (precision.trim(), scale.trim()),
        None => (params.trim(), "0"),
    };
    DataType::decimal(precision.parse().ok()?, scale.parse().ok()?).ok()
}

fn bracketed<'a>(key: &'a str, name: &str) -> Option<&'a str> {
    key.strip_prefix(name)?
        .trim()
        .strip_prefix('[')?
        .strip_suffix(']')
        .map(str::trim)
}

/// The process-wide default registry
#[must_use]
pub fn registry() -> &'static TypeRegistry {
    &DEFAULT_REGISTRY
}

/// Resolve an indicator with the default registry
pub fn resolve<'a>(indicator: impl Into<TypeIndicator<'a>>) -> Result<Dtype> {
    registry().resolve(indicator)
}
