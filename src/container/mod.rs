//! Column and table containers, and the masks describing them.

pub mod column;
pub mod mask;
pub mod table;
pub mod temporal;
pub mod value;

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;

pub use column::Column;
pub use mask::{Mask, TableMask};
pub use table::Table;
pub use value::Value;

/// Anything the coercion engine accepts: one column or a table of them
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Column(Column),
    Table(Table),
}

impl Container {
    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Column(column) => column.len(),
            Self::Table(table) => table.num_rows(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn as_column(&self) -> Option<&Column> {
        match self {
            Self::Column(column) => Some(column),
            Self::Table(_) => None,
        }
    }

    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Column(_) => None,
            Self::Table(table) => Some(table),
        }
    }

    /// The Arrow array of a typed single-column container
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        self.as_column().and_then(Column::as_array)
    }
}

impl From<ArrayRef> for Container {
    fn from(array: ArrayRef) -> Self {
        Self::Column(Column::Array(array))
    }
}

impl From<Column> for Container {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<Vec<Value>> for Container {
    fn from(values: Vec<Value>) -> Self {
        Self::Column(Column::Object(values))
    }
}

impl From<Table> for Container {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<RecordBatch> for Container {
    fn from(batch: RecordBatch) -> Self {
        Self::Table(Table::from_record_batch(&batch))
    }
}

impl From<&RecordBatch> for Container {
    fn from(batch: &RecordBatch) -> Self {
        Self::Table(Table::from_record_batch(batch))
    }
}
