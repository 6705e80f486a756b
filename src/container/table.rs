//! Tables of named columns sharing a row count.

use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use rustc_hash::FxHashSet;

use crate::container::column::Column;
use crate::error::{Error, Result};

/// An ordered set of uniquely named, equally long columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Build a table, rejecting duplicate names and ragged columns
    pub fn try_new(columns: Vec<(String, Column)>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |(_, column)| column.len());
        let mut seen = FxHashSet::default();
        for (name, column) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidContainer(format!(
                    "duplicate column name '{name}'"
                )));
            }
            if column.len() != num_rows {
                return Err(Error::InvalidContainer(format!(
                    "column '{name}' has {} rows, expected {num_rows}",
                    column.len()
                )));
            }
        }

        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            num_rows,
        })
    }

    /// Build from parts already known to satisfy the table invariants
    pub(crate) fn from_parts(names: Vec<String>, columns: Vec<Column>, num_rows: usize) -> Self {
        Self {
            names,
            columns,
            num_rows,
        }
    }

    /// Wrap every column of a record batch
    #[must_use]
    pub fn from_record_batch(batch: &RecordBatch) -> Self {
        let names = batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect();
        let columns = batch.columns().iter().cloned().map(Column::Array).collect();
        Self::from_parts(names, columns, batch.num_rows())
    }

    /// Export to a record batch; fails if any column holds object values
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());
        for (name, column) in self.iter() {
            let array = column.as_array().ok_or_else(|| {
                Error::InvalidContainer(format!(
                    "column '{name}' holds object values and has no Arrow type"
                ))
            })?;
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(Arc::clone(array));
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &options,
        )?)
    }

    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        let index = self.names.iter().position(|n| n == name)?;
        self.columns.get(index)
    }

    /// Iterate over `(name, column)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }
}
