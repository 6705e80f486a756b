//! A single column: typed Arrow storage or heterogeneous object values.

use arrow::array::{Array, ArrayRef};

use crate::container::value::Value;
use crate::dtype::DataType;
use crate::error::Result;

/// An ordered sequence of values
#[derive(Debug, Clone)]
pub enum Column {
    /// Uniformly typed Arrow storage
    Array(ArrayRef),
    /// Values whose kinds may differ from element to element
    Object(Vec<Value>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Array(array) => array.len(),
            Self::Object(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn null_count(&self) -> usize {
        match self {
            Self::Array(array) => array.null_count(),
            Self::Object(values) => values.iter().filter(|v| v.is_null()).count(),
        }
    }

    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        match self {
            Self::Array(array) => array.is_null(index),
            Self::Object(values) => values.get(index).is_none_or(Value::is_null),
        }
    }

    /// The value at `index`, read into a [`Value`]
    #[must_use]
    pub fn value(&self, index: usize) -> Value {
        match self {
            Self::Array(array) => Value::from_array(array.as_ref(), index),
            Self::Object(values) => values.get(index).cloned().unwrap_or(Value::Null),
        }
    }

    /// The descriptor of the column's native storage
    pub fn dtype(&self) -> Result<DataType> {
        match self {
            Self::Array(array) => DataType::from_arrow(array.data_type()),
            Self::Object(_) => Ok(DataType::Object),
        }
    }

    /// The Arrow array backing a typed column
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(array) => Some(array),
            Self::Object(_) => None,
        }
    }

    /// A column of `length` elements starting at `offset`
    #[must_use]
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        match self {
            Self::Array(array) => Self::Array(array.slice(offset, length)),
            Self::Object(values) => {
                let end = (offset + length).min(values.len());
                Self::Object(values.get(offset..end).unwrap_or_default().to_vec())
            }
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(left), Self::Array(right)) => left.as_ref() == right.as_ref(),
            (Self::Object(left), Self::Object(right)) => left == right,
            _ => false,
        }
    }
}

impl From<ArrayRef> for Column {
    fn from(array: ArrayRef) -> Self {
        Self::Array(array)
    }
}

impl From<Vec<Value>> for Column {
    fn from(values: Vec<Value>) -> Self {
        Self::Object(values)
    }
}
