//! Coercion of typed Arrow columns.
//!
//! Every column is handled by one [`Kernel`], chosen from its storage type and
//! the target. Both the lenient conversion (which yields the mask) and the
//! strict conversion run the same kernel, so they cannot disagree about which
//! elements convert.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, StringArray, new_null_array};
use arrow::compute::kernels::cast::{CastOptions, can_cast_types, cast_with_options};
use arrow::compute::{is_null, not, nullif};
use arrow::datatypes::{DataType as ArrowDataType, Float32Type, Float64Type};
use arrow::util::display::FormatOptions;
use log::debug;

use crate::coerce::object;
use crate::coerce::types::Kernel;
use crate::config::CoercionConfig;
use crate::container::column::Column;
use crate::container::value::Value;
use crate::dtype::{DataType, categorical_arrow_type, is_string_like};
use crate::error::{Error, Result};

/// Choose the kernel converting `source` storage to `target`
#[must_use]
pub fn select_kernel(source: &ArrowDataType, target: &DataType) -> Kernel {
    let Some(target_type) = target.to_arrow() else {
        return Kernel::Objectify;
    };
    let source_dtype = DataType::from_arrow(source).ok();
    let by_value = source_dtype
        .as_ref()
        .is_some_and(|source| has_value_rules(source) || has_value_rules(target));

    if *source == target_type || source_dtype.as_ref() == Some(target) {
        Kernel::Identity
    } else if *source == ArrowDataType::Null {
        Kernel::Nulls
    } else if *target == DataType::Null {
        Kernel::NullTarget
    } else if *target == DataType::String {
        Kernel::Stringify
    } else if *target == DataType::Categorical {
        Kernel::Categorize
    } else if is_string_like(source) {
        Kernel::Parse
    } else if by_value {
        Kernel::Convert
    } else if can_cast_types(source, &target_type) {
        Kernel::ArrowCast
    } else {
        Kernel::Unsupported
    }
}

/// Temporal and decimal conversions follow the per-element rules rather than
/// Arrow's cast kernel, which reinterprets ticks and rounds scales
fn has_value_rules(data_type: &DataType) -> bool {
    data_type.is_temporal() || data_type.is_decimal()
}

/// Convert with failing elements nulled, returning the result and its mask
///
/// Never fails: a kernel error is treated as "nothing converts".
pub(crate) fn coerce_lenient(
    array: &ArrayRef,
    target: &DataType,
    config: &CoercionConfig,
) -> (Column, BooleanArray) {
    let kernel = select_kernel(array.data_type(), target);
    debug!(
        "Lenient coercion of {} values from {} to {target} via {kernel:?}",
        array.len(),
        array.data_type()
    );

    let outcome = match kernel {
        Kernel::Objectify => Some((
            Column::Object(Value::from_array_all(array.as_ref())),
            all_true(array.len()),
        )),
        Kernel::Identity => Some((Column::Array(Arc::clone(array)), all_true(array.len()))),
        Kernel::Nulls => Some((Column::Array(nulls(target, array.len())), all_true(array.len()))),
        Kernel::NullTarget | Kernel::Unsupported => None,
        Kernel::Stringify | Kernel::Categorize | Kernel::ArrowCast => {
            cast_lenient(array, target, config)
        }
        Kernel::Parse | Kernel::Convert => element_values(array, &kernel, config)
            .ok()
            .map(|values| object::coerce_lenient(&values, target, config)),
    };

    outcome.unwrap_or_else(|| unsupported(array, target))
}

/// Convert every element or fail on the first one that does not convert
pub(crate) fn coerce_strict(
    array: &ArrayRef,
    target: &DataType,
    config: &CoercionConfig,
) -> Result<Column> {
    let kernel = select_kernel(array.data_type(), target);
    debug!(
        "Coercing {} values from {} to {target} via {kernel:?}",
        array.len(),
        array.data_type()
    );

    match kernel {
        Kernel::Objectify => Ok(Column::Object(Value::from_array_all(array.as_ref()))),
        Kernel::Identity => Ok(Column::Array(Arc::clone(array))),
        Kernel::Nulls => Ok(Column::Array(nulls(target, array.len()))),
        Kernel::NullTarget | Kernel::Unsupported => {
            if let Some(index) = (0..array.len()).find(|&i| array.is_valid(i)) {
                return Err(Error::coercion(
                    target,
                    Some(index),
                    format!(
                        "no conversion from {} value {} to {target}",
                        array.data_type(),
                        Value::from_array(array.as_ref(), index)
                    ),
                ));
            }
            Ok(Column::Array(nulls(target, array.len())))
        }
        Kernel::Stringify | Kernel::Categorize | Kernel::ArrowCast => {
            cast_strict(array, target, config).map(Column::Array)
        }
        Kernel::Parse | Kernel::Convert => {
            object::coerce_strict(&element_values(array, &kernel, config)?, target, config)
        }
    }
}

fn all_true(len: usize) -> BooleanArray {
    BooleanArray::from(vec![true; len])
}

fn nulls(target: &DataType, len: usize) -> ArrayRef {
    new_null_array(&target.to_arrow().unwrap_or(ArrowDataType::Null), len)
}

/// Only source nulls are coercible; the result is all null
fn unsupported(array: &ArrayRef, target: &DataType) -> (Column, BooleanArray) {
    let mask = is_null(array.as_ref())
        .unwrap_or_else(|_| BooleanArray::from(vec![false; array.len()]));
    (Column::Array(nulls(target, array.len())), mask)
}

/// Dates cast to strings use the configured output format
fn cast_options(safe: bool, config: &CoercionConfig) -> CastOptions<'_> {
    CastOptions {
        safe,
        format_options: FormatOptions::default()
            .with_date_format(Some(&config.date_format_config.default_format)),
    }
}

/// Run the cast kernel for `target`, in safe or unsafe mode
fn cast_to(
    array: &ArrayRef,
    target: &DataType,
    safe: bool,
    config: &CoercionConfig,
) -> Result<ArrayRef> {
    let options = cast_options(safe, config);
    let result = match target {
        DataType::Categorical => {
            let strings = cast_with_options(array, &ArrowDataType::Utf8, &options)?;
            cast_with_options(&strings, &categorical_arrow_type(), &options)?
        }
        DataType::String => cast_with_options(array, &ArrowDataType::Utf8, &options)?,
        other => {
            let target_type = other.to_arrow().ok_or_else(|| {
                Error::coercion(other, None, "object values have no Arrow storage type")
            })?;
            cast_with_options(array, &target_type, &options)?
        }
    };
    Ok(result)
}

/// Mask bit per element: nulls stay coercible, anything the cast nulled or
/// narrowed from finite to infinite is not
fn cast_mask(source: &dyn Array, result: &dyn Array) -> BooleanArray {
    let narrowed = source
        .as_primitive_opt::<Float64Type>()
        .zip(result.as_primitive_opt::<Float32Type>());

    (0..source.len())
        .map(|i| {
            if source.is_null(i) {
                return Some(true);
            }
            if result.is_null(i) {
                return Some(false);
            }
            let overflowed = narrowed.is_some_and(|(wide, narrow)| {
                wide.value(i).is_finite() && narrow.value(i).is_infinite()
            });
            Some(!overflowed)
        })
        .collect()
}

fn cast_lenient(
    array: &ArrayRef,
    target: &DataType,
    config: &CoercionConfig,
) -> Option<(Column, BooleanArray)> {
    let result = cast_to(array, target, true, config).ok()?;
    let mask = cast_mask(array.as_ref(), result.as_ref());

    // Safe casts already null their failures; overflowed floats are still valid
    let needs_nulling = (0..mask.len()).any(|i| !mask.value(i) && result.is_valid(i));
    let result = if needs_nulling {
        nullif(result.as_ref(), &not(&mask).ok()?).ok()?
    } else {
        result
    };
    Some((Column::Array(result), mask))
}

fn cast_strict(array: &ArrayRef, target: &DataType, config: &CoercionConfig) -> Result<ArrayRef> {
    let first_failure = || {
        let result = cast_to(array, target, true, config).ok()?;
        let mask = cast_mask(array.as_ref(), result.as_ref());
        mask.iter().position(|bit| bit == Some(false))
    };
    let failure_reason = |index: usize| {
        format!(
            "{} value {} does not convert",
            array.data_type(),
            Value::from_array(array.as_ref(), index)
        )
    };

    let result = match cast_to(array, target, false, config) {
        Ok(result) => result,
        Err(Error::Arrow(err)) => {
            return Err(Error::coercion(target, first_failure(), err.to_string()));
        }
        Err(other) => return Err(other),
    };

    // Some kernels null out what they cannot represent even in unsafe mode
    let mask = cast_mask(array.as_ref(), result.as_ref());
    if let Some(index) = mask.iter().position(|bit| bit == Some(false)) {
        return Err(Error::coercion(target, Some(index), failure_reason(index)));
    }
    Ok(result)
}

/// The string values of a string-like column, as a plain `Utf8` array
fn string_values(array: &ArrayRef, config: &CoercionConfig) -> Result<StringArray> {
    let strings = cast_with_options(array, &ArrowDataType::Utf8, &cast_options(false, config))?;
    Ok(strings.as_string::<i32>().clone())
}

/// Elements handed to the per-element rules: parsed kernels see strings
fn element_values(
    array: &ArrayRef,
    kernel: &Kernel,
    config: &CoercionConfig,
) -> Result<Vec<Value>> {
    if *kernel == Kernel::Parse {
        let strings = string_values(array, config)?;
        return Ok(strings.iter().map(Value::from).collect());
    }
    Ok(Value::from_array_all(array.as_ref()))
}
