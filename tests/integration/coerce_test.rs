use std::sync::Arc;

use anyhow::Result;
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Date64Array, DictionaryArray, Float32Array,
    Float64Array, Int16Array, Int64Array, LargeStringArray, StringArray, StringViewArray,
    Time32SecondArray, Time64MicrosecondArray, TimestampMillisecondArray, UInt8Array,
    new_null_array,
};
use arrow::datatypes::{DataType as ArrowDataType, Int32Type, UInt32Type};
use colcoerce::{
    Coercer, CoercionConfig, Container, DataType, Error, TimeUnit, coerce, try_coerce,
};

use crate::utils::{column_bits, downcast, init_logging, int64_column, string_column};

#[test]
fn test_strict_coercion_reports_first_failure() {
    init_logging();
    let column = int64_column(vec![Some(1000), Some(100), Some(2000)]);
    let err = coerce(&column, &DataType::UInt8).unwrap_err();
    match err {
        Error::Coercion {
            target,
            column,
            index,
            ..
        } => {
            assert_eq!(target, DataType::UInt8);
            assert_eq!(column, None);
            assert_eq!(index, Some(0));
        }
        other => panic!("expected a coercion error, got {other}"),
    }
}

#[test]
fn test_lenient_coercion_degrades_failures() {
    init_logging();
    let column = int64_column(vec![Some(1000), Some(100), Some(200)]);
    let err = try_coerce(&column, &DataType::UInt8).unwrap_err();
    let cases = err.failure_cases().expect("parser error carries failure cases");

    assert_eq!(cases.target, DataType::UInt8);
    assert_eq!(cases.original, column);
    assert_eq!(column_bits(&cases.mask), vec![false, true, true]);
    assert_eq!(
        downcast::<UInt8Array>(&cases.degraded),
        UInt8Array::from(vec![None, Some(100), Some(200)])
    );
    assert_eq!(cases.failure_count(), 1);
    assert_eq!(cases.failures[0].index, 0);
    assert_eq!(cases.failures[0].value.to_string(), "1000");
    assert!(err.to_string().contains("1 value(s)"));
}

#[test]
fn test_lenient_coercion_succeeds_when_everything_converts() -> Result<()> {
    let column = string_column(vec![Some("1"), None, Some("3")]);
    let coerced = try_coerce(&column, &DataType::Int16)?;
    assert_eq!(
        downcast::<Int16Array>(&coerced),
        Int16Array::from(vec![Some(1), None, Some(3)])
    );
    Ok(())
}

#[test]
fn test_strings_to_boolean() -> Result<()> {
    let column = string_column(vec![Some("False"), Some("False")]);
    let coerced = coerce(&column, &DataType::Boolean)?;
    assert_eq!(
        downcast::<BooleanArray>(&coerced),
        BooleanArray::from(vec![false, false])
    );
    Ok(())
}

#[test]
fn test_strings_to_categorical() -> Result<()> {
    let column = string_column(vec![Some("a"), Some("b"), Some("a")]);
    let coerced = coerce(&column, &DataType::Categorical)?;
    let dictionary = downcast::<DictionaryArray<UInt32Type>>(&coerced);
    assert_eq!(dictionary.values().len(), 2);
    assert_eq!(dictionary.keys().value(0), dictionary.keys().value(2));
    Ok(())
}

#[test]
fn test_integers_to_strings() -> Result<()> {
    let coerced = coerce(&int64_column(vec![Some(7), None]), &DataType::String)?;
    assert_eq!(
        downcast::<StringArray>(&coerced),
        StringArray::from(vec![Some("7"), None])
    );
    Ok(())
}

#[test]
fn test_strings_to_temporal_types() -> Result<()> {
    let dates = coerce(
        &string_column(vec![Some("1970-01-02"), Some("20230115")]),
        &DataType::Date,
    )?;
    assert_eq!(downcast::<Date32Array>(&dates), Date32Array::from(vec![1, 19_372]));

    let stamps = coerce(
        &string_column(vec![Some("1970-01-01 00:00:01.5")]),
        &DataType::Datetime(TimeUnit::Millisecond),
    )?;
    assert_eq!(
        downcast::<TimestampMillisecondArray>(&stamps),
        TimestampMillisecondArray::from(vec![1_500])
    );
    Ok(())
}

#[test]
fn test_float_overflow_fails_strictly() {
    let column = Container::from(Arc::new(Float64Array::from(vec![1e300, 1.0])) as ArrayRef);
    assert!(matches!(
        coerce(&column, &DataType::Float32),
        Err(Error::Coercion { index: Some(0), .. })
    ));

    let err = try_coerce(&column, &DataType::Float32).unwrap_err();
    let cases = err.failure_cases().unwrap();
    let degraded = downcast::<Float32Array>(&cases.degraded);
    assert!(degraded.is_null(0));
    assert_eq!(degraded.value(1), 1.0);
}

#[test]
fn test_identity_coercion() -> Result<()> {
    let containers = [
        int64_column(vec![Some(1), None, Some(i64::MAX)]),
        string_column(vec![Some("x"), None]),
        Container::from(Arc::new(BooleanArray::from(vec![true, false])) as ArrayRef),
        Container::from(Arc::new(LargeStringArray::from(vec!["x", "y"])) as ArrayRef),
        Container::from(Arc::new(StringViewArray::from(vec!["x", "y"])) as ArrayRef),
        Container::from(Arc::new(Date64Array::from(vec![86_400_000])) as ArrayRef),
        Container::from(Arc::new(Time32SecondArray::from(vec![3_600])) as ArrayRef),
        Container::from(Arc::new(Time64MicrosecondArray::from(vec![1_000_000])) as ArrayRef),
        Container::from(Arc::new(
            vec!["a", "b", "a"].into_iter().collect::<DictionaryArray<Int32Type>>(),
        ) as ArrayRef),
    ];
    for container in containers {
        let dtype = container.as_column().unwrap().dtype()?;
        assert_eq!(coerce(&container, &dtype)?, container);
    }
    Ok(())
}

#[test]
fn test_coercion_is_idempotent() -> Result<()> {
    let cases = [
        (string_column(vec![Some("1"), Some("2")]), DataType::UInt16),
        (int64_column(vec![Some(5), None]), DataType::Float32),
        (string_column(vec![Some("x"), Some("y")]), DataType::Categorical),
        (
            string_column(vec![Some("2023-01-15 10:30:00.123456")]),
            DataType::Datetime(TimeUnit::Millisecond),
        ),
        (int64_column(vec![Some(1)]), DataType::decimal(10, 2)?),
    ];
    for (container, target) in cases {
        let once = coerce(&container, &target)?;
        let twice = coerce(&once, &target)?;
        assert_eq!(once, twice, "coercion to {target} is not idempotent");
    }
    Ok(())
}

#[test]
fn test_null_source_becomes_typed_nulls() -> Result<()> {
    let nulls = Container::from(new_null_array(&ArrowDataType::Null, 3));
    let coerced = coerce(&nulls, &DataType::Int64)?;
    let array = downcast::<Int64Array>(&coerced);
    assert_eq!(array.len(), 3);
    assert_eq!(array.null_count(), 3);
    Ok(())
}

#[test]
fn test_inputs_are_not_mutated() {
    let column = int64_column(vec![Some(1000), Some(1)]);
    let before = column.clone();
    let _ = try_coerce(&column, &DataType::UInt8);
    let _ = coerce(&column, &DataType::UInt8);
    assert_eq!(column, before);
}

#[test]
fn test_failure_cases_record_batch() -> Result<()> {
    let column = string_column(vec![Some("1"), Some("x"), Some("y")]);
    let err = try_coerce(&column, &DataType::Int32).unwrap_err();
    let batch = err.failure_cases().unwrap().to_record_batch()?;

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema().field(2).name(), "failure_case");
    let cases = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(cases, &StringArray::from(vec!["x", "y"]));
    assert_eq!(batch.column(0).null_count(), 2);
    Ok(())
}

#[test]
fn test_data_type_convenience_methods() -> Result<()> {
    let column = string_column(vec![Some("1"), Some("b")]);
    assert_eq!(column_bits(&DataType::Int64.coercible(&column)), vec![true, false]);
    assert!(DataType::Int64.coerce(&column).is_err());
    assert!(matches!(DataType::Int64.try_coerce(&column), Err(Error::Parser(_))));
    assert!(DataType::String.coerce(&column).is_ok());
    Ok(())
}

#[test]
fn test_configured_date_formats() -> Result<()> {
    let config = CoercionConfig::from_json(
        r#"{
            "date_format_config": {
                "date_formats": ["%d|%m|%Y"],
                "enable_format_detection": false
            }
        }"#,
    )?;
    let coercer = Coercer::new(config);
    let column = string_column(vec![Some("02|01|1970"), Some("1970-01-02")]);

    let mask = coercer.coercible_mask(&column, &DataType::Date);
    assert_eq!(column_bits(&mask), vec![true, false]);
    Ok(())
}
