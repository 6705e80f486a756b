//! Error handling for coercion.

use arrow::error::ArrowError;

use crate::coerce::failure::FailureCases;
use crate::dtype::DataType;

/// Errors raised at the boundary of the coercion engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A type indicator that the registry cannot resolve
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Strict coercion failed; describes the first offending element
    #[error(
        "Could not coerce {} to {target}: {reason}",
        .column.as_deref().map_or_else(|| "column".to_string(), |c| format!("column '{c}'"))
    )]
    Coercion {
        /// Requested target type
        target: DataType,
        /// Name of the failing column, for tables
        column: Option<String>,
        /// Row of the first failing element, when known
        index: Option<usize>,
        /// Human readable description of the failure
        reason: String,
    },

    /// Lenient coercion found elements that cannot be coerced
    #[error("{0}")]
    Parser(Box<FailureCases>),

    /// A container that violates its own shape rules
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl Error {
    /// Build a strict coercion error for a single column
    pub(crate) fn coercion(
        target: &DataType,
        index: Option<usize>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            target: target.clone(),
            column: None,
            index,
            reason: reason.into(),
        }
    }

    /// Attach a column name to a coercion error; other errors pass through
    #[must_use]
    pub fn in_column(self, name: &str) -> Self {
        match self {
            Self::Coercion {
                target,
                index,
                reason,
                ..
            } => Self::Coercion {
                target,
                column: Some(name.to_string()),
                index,
                reason,
            },
            other => other,
        }
    }

    /// The failure case record carried by a [`Error::Parser`]
    #[must_use]
    pub fn failure_cases(&self) -> Option<&FailureCases> {
        match self {
            Self::Parser(cases) => Some(cases),
            _ => None,
        }
    }
}

/// Result type for coercion operations
pub type Result<T> = std::result::Result<T, Error>;
