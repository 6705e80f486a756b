//! Core types shared by the evaluator and the executor.

use serde::{Deserialize, Serialize};

use crate::dtype::DataType;

/// Why a single element could not be converted
///
/// This is data, not control flow: the evaluator turns it into a mask bit and
/// the executor turns the first one into a strict coercion error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value lies outside the target's representable range
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: DataType },

    /// A string that the canonical parser for the target rejects
    #[error("could not parse '{value}' as {target}")]
    Unparsable { value: String, target: DataType },

    /// A float that would overflow to infinity in the target
    #[error("{value} overflows {target}")]
    Overflow { value: String, target: DataType },

    /// Conversion would drop significant digits
    #[error("{value} cannot be represented exactly as {target}")]
    Lossy { value: String, target: DataType },

    /// No conversion exists between the value's kind and the target
    #[error("cannot convert {kind} value {value} to {target}")]
    Unsupported {
        kind: &'static str,
        value: String,
        target: DataType,
    },
}

/// Kernel used by the typed path for a (source, target) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kernel {
    /// Source storage already matches the target
    Identity,
    /// Source is all-null; result is an all-null array of the target type
    Nulls,
    /// Only nulls survive a cast to the null type
    NullTarget,
    /// Render every value as a string
    Stringify,
    /// Render as strings, then dictionary-encode
    Categorize,
    /// Parse strings with the canonical parser for the target
    Parse,
    /// Convert element by element with the same rules as object values
    Convert,
    /// Extract every element into a dynamically typed value
    Objectify,
    /// Arrow's cast kernel
    ArrowCast,
    /// No conversion exists; every non-null element fails
    Unsupported,
}

/// Configuration for date format handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatConfig {
    /// List of date format strings to try when parsing dates
    pub date_formats: Vec<String>,
    /// Default date format to use when converting dates to strings
    pub default_format: String,
    /// Enable heuristic format detection
    pub enable_format_detection: bool,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2023-01-15
                "%d-%m-%Y".to_string(), // European: 15-01-2023
                "%m/%d/%Y".to_string(), // US: 01/15/2023
                "%d/%m/%Y".to_string(), // UK: 15/01/2023
                "%d.%m.%Y".to_string(), // German/Danish: 15.01.2023
                "%Y%m%d".to_string(),   // Compact: 20230115
                "%d %b %Y".to_string(), // 15 Jan 2023
                "%d %B %Y".to_string(), // 15 January 2023
            ],
            default_format: "%Y-%m-%d".to_string(),
            enable_format_detection: true,
        }
    }
}
