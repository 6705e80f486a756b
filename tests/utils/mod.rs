use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Int64Array, StringArray};
use colcoerce::{Column, Container, Mask, Table};

/// Route library logs through `env_logger` for the current test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A single-column container of nullable `Int64` values
#[must_use]
pub fn int64_column(values: Vec<Option<i64>>) -> Container {
    Container::from(Arc::new(Int64Array::from(values)) as ArrayRef)
}

/// A single-column container of nullable `Utf8` values
#[must_use]
pub fn string_column(values: Vec<Option<&str>>) -> Container {
    Container::from(Arc::new(StringArray::from(values)) as ArrayRef)
}

/// A table of `Utf8` columns
pub fn string_table(columns: Vec<(&str, Vec<&str>)>) -> colcoerce::Result<Container> {
    let columns = columns
        .into_iter()
        .map(|(name, values)| {
            let array = Arc::new(StringArray::from(values)) as ArrayRef;
            (name.to_string(), Column::Array(array))
        })
        .collect();
    Ok(Container::Table(Table::try_new(columns)?))
}

/// The mask of a single-column container as plain booleans
#[must_use]
pub fn column_bits(mask: &Mask) -> Vec<bool> {
    let mask = mask.as_column().expect("column mask");
    mask.iter().map(|bit| bit.unwrap_or(false)).collect()
}

/// The mask of one table column as plain booleans
#[must_use]
pub fn table_bits(mask: &Mask, column: &str) -> Vec<bool> {
    let mask = mask
        .as_table()
        .and_then(|mask| mask.column(column))
        .expect("table mask column");
    mask.iter().map(|bit| bit.unwrap_or(false)).collect()
}

/// Downcast the array of a single-column container
#[must_use]
pub fn downcast<T: Array + Clone + 'static>(container: &Container) -> T {
    container
        .as_array()
        .and_then(|array| array.as_any().downcast_ref::<T>())
        .cloned()
        .expect("array of the expected type")
}

/// Whether every bit in a boolean array is set
#[must_use]
pub fn all_set(mask: &BooleanArray) -> bool {
    mask.false_count() == 0 && mask.null_count() == 0
}
