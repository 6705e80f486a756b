//! Coercion one element at a time, for object columns and for typed columns
//! whose conversion follows the per-element rules.

use arrow::array::{BooleanArray, new_null_array};
use arrow::datatypes::DataType as ArrowDataType;
use log::debug;

use crate::coerce::value::coerce_value;
use crate::config::CoercionConfig;
use crate::container::column::Column;
use crate::container::value::{Value, values_to_array};
use crate::dtype::DataType;
use crate::error::{Error, Result};

/// Convert every value with failures nulled, returning the result and its mask
pub(crate) fn coerce_lenient(
    values: &[Value],
    target: &DataType,
    config: &CoercionConfig,
) -> (Column, BooleanArray) {
    debug!("Lenient coercion of {} values to {target}", values.len());

    if *target == DataType::Object {
        return (
            Column::Object(values.to_vec()),
            BooleanArray::from(vec![true; values.len()]),
        );
    }

    let (converted, mask): (Vec<Value>, Vec<bool>) = values
        .iter()
        .map(|value| {
            coerce_value(value, target, config).map_or((Value::Null, false), |value| (value, true))
        })
        .unzip();

    match values_to_array(&converted, target) {
        Ok(array) => (Column::Array(array), BooleanArray::from(mask)),
        Err(err) => {
            debug!("Could not materialize {target} values: {err}");
            let storage = target.to_arrow().unwrap_or(ArrowDataType::Null);
            let mask = values.iter().map(|value| Some(value.is_null())).collect();
            (Column::Array(new_null_array(&storage, values.len())), mask)
        }
    }
}

/// Convert every value or fail on the first one that does not convert
pub(crate) fn coerce_strict(
    values: &[Value],
    target: &DataType,
    config: &CoercionConfig,
) -> Result<Column> {
    debug!("Coercing {} values to {target}", values.len());

    if *target == DataType::Object {
        return Ok(Column::Object(values.to_vec()));
    }

    let converted = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            coerce_value(value, target, config)
                .map_err(|err| Error::coercion(target, Some(index), err.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    values_to_array(&converted, target).map(Column::Array)
}
