//! Strict and lenient coercion of whole containers.

use arrow::array::BooleanArray;
use log::{debug, warn};
use rayon::prelude::*;

use crate::coerce::failure::{FailureCase, FailureCases};
use crate::coerce::{object, typed};
use crate::config::CoercionConfig;
use crate::container::mask::failing_rows;
use crate::container::{Column, Container, Mask, Table, TableMask};
use crate::dtype::DataType;
use crate::error::{Error, Result};

/// Outcome of coercing one column inside `try_coerce`
enum Attempt {
    /// Every element converted
    Converted(Column),
    /// Some elements failed; they are null in `column` and false in `mask`
    Degraded { column: Column, mask: BooleanArray },
}

/// Coerces containers to a target type under a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Coercer {
    config: CoercionConfig,
}

impl Coercer {
    #[must_use]
    pub const fn new(config: CoercionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &CoercionConfig {
        &self.config
    }

    /// Which elements of `container` can be coerced to `target`
    #[must_use]
    pub fn coercible_mask(&self, container: &Container, target: &DataType) -> Mask {
        match container {
            Container::Column(column) => Mask::Column(self.lenient_column(column, target).1),
            Container::Table(table) => {
                let masks =
                    self.map_columns(table, |_, column| self.lenient_column(column, target).1);
                Mask::Table(TableMask::new(table.names().to_vec(), masks, table.num_rows()))
            }
        }
    }

    /// Coerce every element or fail on the first that does not convert
    pub fn coerce(&self, container: &Container, target: &DataType) -> Result<Container> {
        match container {
            Container::Column(column) => self.strict_column(column, target).map(Container::Column),
            Container::Table(table) => {
                let results =
                    self.map_columns(table, |_, column| self.strict_column(column, target));
                let columns = table
                    .names()
                    .iter()
                    .zip(results)
                    .map(|(name, result)| result.map_err(|err| err.in_column(name)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Container::Table(Table::from_parts(
                    table.names().to_vec(),
                    columns,
                    table.num_rows(),
                )))
            }
        }
    }

    /// Coerce, reporting every non-coercible element instead of the first.
    ///
    /// Succeeds with the coerced container when every element converts.
    /// Otherwise fails with [`Error::Parser`] carrying the original container,
    /// the degraded result, the mask and the list of failure cases.
    pub fn try_coerce(&self, container: &Container, target: &DataType) -> Result<Container> {
        let (degraded, mask, failures) = match container {
            Container::Column(original) => match self.attempt_column(original, target)? {
                Attempt::Converted(converted) => return Ok(Container::Column(converted)),
                Attempt::Degraded { column, mask } => {
                    let failures = failure_cases(None, original, &mask);
                    (Container::Column(column), Mask::Column(mask), failures)
                }
            },
            Container::Table(table) => {
                let attempts =
                    self.map_columns(table, |_, column| self.attempt_column(column, target));

                let mut columns = Vec::with_capacity(table.num_columns());
                let mut masks = Vec::with_capacity(table.num_columns());
                let mut failures = Vec::new();
                for ((name, original), attempt) in table.iter().zip(attempts) {
                    match attempt.map_err(|err| err.in_column(name))? {
                        Attempt::Converted(converted) => {
                            masks.push(BooleanArray::from(vec![true; converted.len()]));
                            columns.push(converted);
                        }
                        Attempt::Degraded { column, mask } => {
                            failures.extend(failure_cases(Some(name), original, &mask));
                            masks.push(mask);
                            columns.push(column);
                        }
                    }
                }

                let names = table.names().to_vec();
                if failures.is_empty() {
                    return Ok(Container::Table(Table::from_parts(
                        names,
                        columns,
                        table.num_rows(),
                    )));
                }
                let mask = TableMask::new(names.clone(), masks, table.num_rows());
                let degraded = Table::from_parts(names, columns, table.num_rows());
                (Container::Table(degraded), Mask::Table(mask), failures)
            }
        };

        if self.config.log_failures {
            warn!("{} value(s) could not be coerced to {target}", failures.len());
        }
        Err(Error::Parser(Box::new(FailureCases {
            target: target.clone(),
            original: container.clone(),
            degraded,
            mask,
            failures,
        })))
    }

    /// Strict attempt; on a coercion error fall back to the lenient result
    fn attempt_column(&self, column: &Column, target: &DataType) -> Result<Attempt> {
        match self.strict_column(column, target) {
            Ok(converted) => Ok(Attempt::Converted(converted)),
            Err(err @ Error::Coercion { .. }) => {
                let (degraded, mask) = self.lenient_column(column, target);
                if mask.false_count() == 0 {
                    return Err(err);
                }
                debug!("{} value(s) failed coercion to {target}", mask.false_count());
                Ok(Attempt::Degraded {
                    column: degraded,
                    mask,
                })
            }
            Err(err) => Err(err),
        }
    }

    fn strict_column(&self, column: &Column, target: &DataType) -> Result<Column> {
        match column {
            Column::Array(array) => typed::coerce_strict(array, target, &self.config),
            Column::Object(values) => object::coerce_strict(values, target, &self.config),
        }
    }

    fn lenient_column(&self, column: &Column, target: &DataType) -> (Column, BooleanArray) {
        match column {
            Column::Array(array) => typed::coerce_lenient(array, target, &self.config),
            Column::Object(values) => object::coerce_lenient(values, target, &self.config),
        }
    }

    /// Apply `f` to every column in order, in parallel for wide tables
    fn map_columns<T, F>(&self, table: &Table, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&str, &Column) -> T + Sync,
    {
        if self.config.parallel_columns && table.num_columns() >= self.config.parallel_threshold {
            debug!("Processing {} columns in parallel", table.num_columns());
            table
                .names()
                .par_iter()
                .zip(table.columns().par_iter())
                .map(|(name, column)| f(name, column))
                .collect()
        } else {
            table.iter().map(|(name, column)| f(name, column)).collect()
        }
    }
}

fn failure_cases(
    column_name: Option<&str>,
    original: &Column,
    mask: &BooleanArray,
) -> Vec<FailureCase> {
    failing_rows(mask)
        .map(|index| FailureCase {
            column: column_name.map(str::to_string),
            index,
            value: original.value(index),
        })
        .collect()
}

/// Mask of `container` against `target` with the default configuration
#[must_use]
pub fn coercible_mask(container: &Container, target: &DataType) -> Mask {
    Coercer::default().coercible_mask(container, target)
}

/// Strict coercion with the default configuration
pub fn coerce(container: &Container, target: &DataType) -> Result<Container> {
    Coercer::default().coerce(container, target)
}

/// Lenient coercion with the default configuration
pub fn try_coerce(container: &Container, target: &DataType) -> Result<Container> {
    Coercer::default().try_coerce(container, target)
}

impl DataType {
    /// Strictly coerce `container` to this type
    pub fn coerce(&self, container: &Container) -> Result<Container> {
        coerce(container, self)
    }

    /// Leniently coerce `container` to this type
    pub fn try_coerce(&self, container: &Container) -> Result<Container> {
        try_coerce(container, self)
    }

    /// Which elements of `container` this type can hold
    #[must_use]
    pub fn coercible(&self, container: &Container) -> Mask {
        coercible_mask(container, self)
    }
}
