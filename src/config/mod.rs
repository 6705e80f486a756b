//! Configuration for the coercion engine.

use serde::{Deserialize, Serialize};

use crate::coerce::types::DateFormatConfig;
use crate::error::Result;

/// Configuration for a [`Coercer`](crate::coerce::Coercer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Date format configuration for string-to-date conversions
    pub date_format_config: DateFormatConfig,
    /// Formats tried in order for string-to-datetime conversions
    pub datetime_formats: Vec<String>,
    /// Formats tried in order for string-to-time conversions
    pub time_formats: Vec<String>,
    /// Coerce the columns of a table in parallel
    pub parallel_columns: bool,
    /// Minimum number of columns before a table is processed in parallel
    pub parallel_threshold: usize,
    /// Log a summary of failure cases found by lenient coercion
    pub log_failures: bool,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self {
            date_format_config: DateFormatConfig::default(),
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%Y-%m-%dT%H:%M".to_string(),
            ],
            time_formats: vec!["%H:%M:%S%.f".to_string(), "%H:%M".to_string()],
            parallel_columns: true,
            parallel_threshold: 8,
            log_failures: true,
        }
    }
}

impl CoercionConfig {
    /// Read a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
