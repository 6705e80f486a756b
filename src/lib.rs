//! Data type coercion and compatibility checks for Arrow columns and tables.
//!
//! Type descriptors are resolved from aliases or Arrow types by the
//! [`dtype`] registry. The [`coerce`] module predicts which elements of a
//! [`Container`] convert to a target type, converts strictly, or converts
//! leniently while collecting every failure case.

pub mod coerce;
pub mod config;
pub mod container;
pub mod dtype;
pub mod error;

pub use coerce::{
    Coercer, FailureCase, FailureCases, ValueError, coerce, coerce_value, coercible_mask,
    try_coerce,
};
pub use config::CoercionConfig;
pub use container::{Column, Container, Mask, Table, TableMask, Value};
pub use dtype::{DataType, Dtype, TimeUnit, TypeGroup, TypeIndicator, resolve, satisfies};
pub use error::{Error, Result};

// Arrow types
pub use arrow::array::ArrayRef;
pub use arrow::record_batch::RecordBatch;
