use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, StringArray, UInt32Array,
};
use colcoerce::{Column, Container, DataType, TimeUnit, coerce, coercible_mask};

use crate::utils::{column_bits, init_logging, int64_column, string_column};

#[test]
fn test_integer_narrowing_is_a_range_check() {
    init_logging();
    let mask = coercible_mask(
        &int64_column(vec![Some(1000), Some(100), Some(200)]),
        &DataType::UInt8,
    );
    assert_eq!(column_bits(&mask), vec![false, true, true]);

    let mask = coercible_mask(&int64_column(vec![Some(266), Some(255), Some(1)]), &DataType::UInt8);
    assert_eq!(column_bits(&mask), vec![false, true, true]);

    let mask = coercible_mask(&int64_column(vec![Some(256), Some(-1), Some(0)]), &DataType::UInt8);
    assert_eq!(column_bits(&mask), vec![false, false, true]);
}

#[test]
fn test_signedness_crossings() {
    let int32 = Container::from(Arc::new(Int32Array::from(vec![1, 2, 3])) as ArrayRef);
    assert!(coercible_mask(&int32, &DataType::UInt32).all());

    let uint32 = Container::from(Arc::new(UInt32Array::from(vec![u32::MAX, 0])) as ArrayRef);
    assert!(coercible_mask(&uint32, &DataType::Int64).all());
    assert_eq!(column_bits(&coercible_mask(&uint32, &DataType::Int32)), vec![false, true]);
}

#[test]
fn test_strings_to_boolean() {
    let mask = coercible_mask(
        &string_column(vec![Some("False"), Some("False")]),
        &DataType::Boolean,
    );
    assert!(mask.all());

    let mask = coercible_mask(
        &string_column(vec![Some("TRUE"), Some("yes"), Some("0"), Some("t")]),
        &DataType::Boolean,
    );
    assert_eq!(column_bits(&mask), vec![true, false, true, false]);
}

#[test]
fn test_strings_to_integers() {
    let mask = coercible_mask(
        &string_column(vec![None, Some("False"), Some("1")]),
        &DataType::Int64,
    );
    assert_eq!(column_bits(&mask), vec![true, false, true]);

    let mask = coercible_mask(
        &string_column(vec![Some("1"), Some("2"), Some("3")]),
        &DataType::Int16,
    );
    assert!(mask.all());

    let mask = coercible_mask(&string_column(vec![Some("1"), Some("b")]), &DataType::Int8);
    assert_eq!(column_bits(&mask), vec![true, false]);
}

#[test]
fn test_strings_to_categorical_and_float() {
    let mask = coercible_mask(
        &string_column(vec![Some("False"), Some("False")]),
        &DataType::Categorical,
    );
    assert!(mask.all());

    let mask = coercible_mask(&string_column(vec![None, Some("1")]), &DataType::Float32);
    assert!(mask.all());
}

#[test]
fn test_strings_to_temporal_types() {
    let column = string_column(vec![Some("2023-01-15"), Some("15.01.2023"), Some("soon"), None]);
    assert_eq!(
        column_bits(&coercible_mask(&column, &DataType::Date)),
        vec![true, true, false, true]
    );

    let column = string_column(vec![Some("2023-01-15T10:30:00"), Some("10:30")]);
    assert_eq!(
        column_bits(&coercible_mask(&column, &DataType::Datetime(TimeUnit::Millisecond))),
        vec![true, false]
    );
    assert_eq!(
        column_bits(&coercible_mask(&column, &DataType::Time)),
        vec![false, true]
    );
}

#[test]
fn test_float_narrowing_overflow() {
    let column = Container::from(
        Arc::new(Float64Array::from(vec![1e300, 1.0, f64::NAN, f64::INFINITY])) as ArrayRef,
    );
    assert_eq!(
        column_bits(&coercible_mask(&column, &DataType::Float32)),
        vec![false, true, true, true]
    );
}

#[test]
fn test_nulls_are_always_coercible() {
    let column = int64_column(vec![None, None]);
    for target in [DataType::UInt8, DataType::Boolean, DataType::Date, DataType::Null] {
        assert!(coercible_mask(&column, &target).all(), "null -> {target}");
    }

    let column = int64_column(vec![None, Some(1)]);
    assert_eq!(column_bits(&coercible_mask(&column, &DataType::Null)), vec![true, false]);
}

#[test]
fn test_unsupported_conversion_fails_every_value() {
    let flags = Container::from(Arc::new(BooleanArray::from(vec![Some(true), None])) as ArrayRef);
    assert_eq!(
        column_bits(&coercible_mask(&flags, &DataType::Date)),
        vec![false, true]
    );
}

#[test]
fn test_mask_has_container_shape() {
    let column = int64_column(vec![Some(1), Some(300), None, Some(-5)]);
    let mask = coercible_mask(&column, &DataType::UInt8);
    assert_eq!(mask.as_column().map(|m| m.len()), Some(column.len()));
    assert_eq!(mask.failure_count(), 2);
    assert_eq!(mask.failing_positions(), vec![(None, 1), (None, 3)]);
}

#[test]
fn test_mask_predicts_single_element_coercion() {
    let columns = [
        (int64_column(vec![Some(1000), Some(100), None, Some(-1)]), DataType::UInt8),
        (string_column(vec![Some("1"), Some("a"), None, Some("-7")]), DataType::Int16),
        (string_column(vec![Some("True"), Some("nope"), Some("0")]), DataType::Boolean),
        (
            Container::from(Arc::new(Float64Array::from(vec![1e300, 2.5])) as ArrayRef),
            DataType::Float32,
        ),
    ];

    for (container, target) in columns {
        let mask = coercible_mask(&container, &target);
        let bits = column_bits(&mask);
        let column = container.as_column().expect("column container");
        for (index, bit) in bits.into_iter().enumerate() {
            let single = Container::from(column.slice(index, 1));
            assert_eq!(
                coerce(&single, &target).is_ok(),
                bit,
                "element {index} of {target} disagrees with its mask bit"
            );
        }
    }
}

#[test]
fn test_identity_mask() {
    let strings = Container::from(Column::Array(
        Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef
    ));
    assert!(coercible_mask(&strings, &DataType::String).all());

    let ints = Container::from(Arc::new(Int64Array::from(vec![i64::MIN, i64::MAX])) as ArrayRef);
    assert!(coercible_mask(&ints, &DataType::Int64).all());
    assert!(coercible_mask(&ints, &DataType::String).all());
}
