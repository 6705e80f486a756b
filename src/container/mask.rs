//! Element-aligned coercibility masks.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::datatypes::{DataType as ArrowDataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use itertools::Itertools;

use crate::error::Result;

/// A boolean mask shaped like the container it describes
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    Column(BooleanArray),
    Table(TableMask),
}

impl Mask {
    /// Whether every element is coercible
    #[must_use]
    pub fn all(&self) -> bool {
        self.failure_count() == 0
    }

    /// Number of non-coercible elements
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Column(mask) => mask.false_count(),
            Self::Table(mask) => mask.failure_count(),
        }
    }

    /// `(column name, row)` for every non-coercible element, in column then row order
    #[must_use]
    pub fn failing_positions(&self) -> Vec<(Option<String>, usize)> {
        match self {
            Self::Column(mask) => failing_rows(mask).map(|row| (None, row)).collect(),
            Self::Table(mask) => mask
                .iter()
                .flat_map(|(name, column)| {
                    failing_rows(column).map(move |row| (Some(name.to_string()), row))
                })
                .collect(),
        }
    }

    #[must_use]
    pub const fn as_column(&self) -> Option<&BooleanArray> {
        match self {
            Self::Column(mask) => Some(mask),
            Self::Table(_) => None,
        }
    }

    #[must_use]
    pub const fn as_table(&self) -> Option<&TableMask> {
        match self {
            Self::Column(_) => None,
            Self::Table(mask) => Some(mask),
        }
    }
}

/// Rows whose mask bit is false
pub(crate) fn failing_rows(mask: &BooleanArray) -> impl Iterator<Item = usize> + '_ {
    mask.iter().positions(|bit| bit == Some(false))
}

/// One mask column per table column, with the table's names and row count
#[derive(Debug, Clone, PartialEq)]
pub struct TableMask {
    names: Vec<String>,
    columns: Vec<BooleanArray>,
    num_rows: usize,
}

impl TableMask {
    pub(crate) fn new(names: Vec<String>, columns: Vec<BooleanArray>, num_rows: usize) -> Self {
        Self {
            names,
            columns,
            num_rows,
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn columns(&self) -> &[BooleanArray] {
        &self.columns
    }

    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&BooleanArray> {
        let index = self.names.iter().position(|n| n == name)?;
        self.columns.get(index)
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.columns.iter().map(BooleanArray::false_count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BooleanArray)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Export as a record batch of non-nullable boolean columns
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .names
            .iter()
            .map(|name| Field::new(name, ArrowDataType::Boolean, false))
            .collect();
        let arrays: Vec<ArrayRef> = self
            .columns
            .iter()
            .map(|column| Arc::new(column.clone()) as ArrayRef)
            .collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &options,
        )?)
    }
}
