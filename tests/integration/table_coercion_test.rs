use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Int64Array, StringArray, UInt32Array};
use arrow::record_batch::RecordBatch;
use colcoerce::{
    Coercer, CoercionConfig, Container, DataType, Error, coerce, coercible_mask, try_coerce,
};

use crate::utils::{all_set, init_logging, string_table, table_bits};

fn uint32_values(container: &Container, column: &str) -> UInt32Array {
    container
        .as_table()
        .and_then(|table| table.column_by_name(column))
        .and_then(|column| column.as_array())
        .and_then(|array| array.as_any().downcast_ref::<UInt32Array>())
        .cloned()
        .expect("UInt32 column")
}

#[test]
fn test_table_mask_per_column() -> Result<()> {
    init_logging();
    let table = string_table(vec![
        ("0", vec!["1000", "a", "200"]),
        ("1", vec!["1000", "100", "c"]),
    ])?;
    let mask = coercible_mask(&table, &DataType::UInt32);

    assert_eq!(table_bits(&mask, "0"), vec![true, false, true]);
    assert_eq!(table_bits(&mask, "1"), vec![true, true, false]);
    assert_eq!(mask.failure_count(), 2);

    let batch = mask.as_table().unwrap().to_record_batch()?;
    assert_eq!(batch.num_columns(), 2);
    assert_eq!(batch.schema().field(0).name(), "0");
    Ok(())
}

#[test]
fn test_table_lenient_failures_are_located() -> Result<()> {
    let table = string_table(vec![
        ("0", vec!["1000", "a", "200"]),
        ("1", vec!["1000", "100", "c"]),
    ])?;
    let err = try_coerce(&table, &DataType::UInt32).unwrap_err();
    let cases = err.failure_cases().unwrap();

    let located: Vec<(Option<&str>, usize, String)> = cases
        .failures
        .iter()
        .map(|f| (f.column.as_deref(), f.index, f.value.to_string()))
        .collect();
    assert_eq!(
        located,
        vec![
            (Some("0"), 1, "a".to_string()),
            (Some("1"), 2, "c".to_string()),
        ]
    );
    assert_eq!(
        uint32_values(&cases.degraded, "0"),
        UInt32Array::from(vec![Some(1000), None, Some(200)])
    );
    Ok(())
}

#[test]
fn test_single_bad_value_only_affects_its_column() -> Result<()> {
    let table = string_table(vec![("good", vec!["1", "2"]), ("bad", vec!["3", "x"])])?;
    let err = try_coerce(&table, &DataType::UInt32).unwrap_err();
    let cases = err.failure_cases().unwrap();

    assert_eq!(cases.failure_count(), 1);
    assert_eq!(cases.failures[0].column.as_deref(), Some("bad"));
    assert_eq!(cases.failures[0].index, 1);

    let mask = cases.mask.as_table().unwrap();
    assert!(all_set(mask.column("good").unwrap()));
    assert_eq!(
        uint32_values(&cases.degraded, "good"),
        UInt32Array::from(vec![1, 2])
    );
    Ok(())
}

#[test]
fn test_strict_table_error_names_column() -> Result<()> {
    let table = string_table(vec![
        ("a", vec!["1", "2"]),
        ("b", vec!["3", "x"]),
        ("c", vec!["y", "5"]),
    ])?;
    match coerce(&table, &DataType::Int64) {
        Err(Error::Coercion { column, index, .. }) => {
            assert_eq!(column.as_deref(), Some("b"));
            assert_eq!(index, Some(1));
        }
        other => panic!("expected a coercion error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_table_coercion_preserves_names_and_order() -> Result<()> {
    let batch = RecordBatch::try_from_iter(vec![
        ("id", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
        ("count", Arc::new(StringArray::from(vec!["10", "20"])) as ArrayRef),
    ])?;
    let coerced = coerce(&Container::from(&batch), &DataType::UInt32)?;
    let table = coerced.as_table().unwrap();
    assert_eq!(table.names(), &["id".to_string(), "count".to_string()]);
    assert_eq!(uint32_values(&coerced, "count"), UInt32Array::from(vec![10, 20]));

    let exported = table.to_record_batch()?;
    assert_eq!(exported.num_rows(), 2);
    Ok(())
}

#[test]
fn test_parallel_and_sequential_agree() -> Result<()> {
    let columns: Vec<(String, Vec<&str>)> = (0..12)
        .map(|i| {
            let values = if i % 3 == 0 {
                vec!["1", "oops", "3"]
            } else {
                vec!["4", "5", "6"]
            };
            (format!("col{i}"), values)
        })
        .collect();
    let table = string_table(columns.iter().map(|(n, v)| (n.as_str(), v.clone())).collect())?;

    let parallel = Coercer::new(CoercionConfig {
        parallel_threshold: 2,
        ..Default::default()
    });
    let sequential = Coercer::new(CoercionConfig {
        parallel_columns: false,
        ..Default::default()
    });

    assert_eq!(
        parallel.coercible_mask(&table, &DataType::Int64),
        sequential.coercible_mask(&table, &DataType::Int64)
    );

    let parallel_err = parallel.try_coerce(&table, &DataType::Int64).unwrap_err();
    let sequential_err = sequential.try_coerce(&table, &DataType::Int64).unwrap_err();
    assert_eq!(
        parallel_err.failure_cases().unwrap().failures,
        sequential_err.failure_cases().unwrap().failures
    );
    assert_eq!(parallel_err.failure_cases().unwrap().failure_count(), 4);
    Ok(())
}
