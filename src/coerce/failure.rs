//! The record raised when lenient coercion finds non-coercible values.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType as ArrowDataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::container::{Container, Mask, Value};
use crate::dtype::DataType;
use crate::error::Result;

/// One element that could not be coerced
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCase {
    /// Column name, for tables
    pub column: Option<String>,
    /// Row of the element
    pub index: usize,
    /// The original value
    pub value: Value,
}

/// Everything lenient coercion learned about a container it could not fully coerce
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCases {
    /// Requested target type
    pub target: DataType,
    /// The input, unchanged
    pub original: Container,
    /// Converted values with every failing element nulled
    pub degraded: Container,
    /// Coercibility of every element
    pub mask: Mask,
    /// Failing elements in column then row order
    pub failures: Vec<FailureCase>,
}

impl FailureCases {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Render the failures as a `column`, `index`, `failure_case` table
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = Schema::new(vec![
            Field::new("column", ArrowDataType::Utf8, true),
            Field::new("index", ArrowDataType::UInt64, false),
            Field::new("failure_case", ArrowDataType::Utf8, false),
        ]);

        let columns: StringArray = self.failures.iter().map(|f| f.column.as_deref()).collect();
        let indices: UInt64Array = self.failures.iter().map(|f| Some(f.index as u64)).collect();
        let cases: StringArray = self
            .failures
            .iter()
            .map(|f| Some(f.value.to_string()))
            .collect();

        Ok(RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(columns) as ArrayRef,
                Arc::new(indices) as ArrayRef,
                Arc::new(cases) as ArrayRef,
            ],
        )?)
    }
}

impl fmt::Display for FailureCases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not coerce {} value(s) to {}",
            self.failure_count(),
            self.target
        )?;
        if let Some(first) = self.failures.first() {
            match &first.column {
                Some(column) => write!(f, "; first failure in column '{column}'")?,
                None => f.write_str("; first failure")?,
            }
            write!(f, " at row {}: {}", first.index, first.value)?;
        }
        Ok(())
    }
}
