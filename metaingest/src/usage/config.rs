//! Usage source configuration.
//!
//! ```yaml
//! top_n_queries: 10
//! bucket_duration: DAY
//! user_email_pattern:
//!   deny: ["svc_.*"]
//! format_sql_queries: false
//! include_top_n_queries: true
//! ```

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{IngestError, Result},
    usage::{AllowDenyPattern, BucketDuration},
};

/// Number of characters allowed across all queries in one usage record.
pub const TOTAL_BUDGET_FOR_QUERY_LIST: usize = 24000;

/// Smallest per-query budget a `top_n_queries` value may leave.
pub const MINIMUM_QUERY_SIZE: usize = 20;

/// Suffix appended to trimmed queries.
pub const DEFAULT_QUERY_TRIMMER: &str = " ...";

/// Validated number of top queries kept per resource and bucket.
///
/// Must be positive and small enough that every query still gets at least
/// [`MINIMUM_QUERY_SIZE`] characters of [`TOTAL_BUDGET_FOR_QUERY_LIST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "u64", into = "u64")]
pub struct TopNQueries(usize);

impl TopNQueries {
    /// Largest accepted value.
    pub const MAX: usize = TOTAL_BUDGET_FOR_QUERY_LIST / MINIMUM_QUERY_SIZE;

    /// # Errors
    ///
    /// Returns [`IngestError::TopNQueries`] for 0 or values above [`Self::MAX`].
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 || value > Self::MAX as u64 {
            return Err(IngestError::TopNQueries {
                value,
                max: Self::MAX as u64,
            });
        }
        Ok(Self(value as usize))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopNQueries {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u64> for TopNQueries {
    type Error = IngestError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TopNQueries> for u64 {
    fn from(value: TopNQueries) -> Self {
        value.0 as u64
    }
}

/// Settings shared by every usage source.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct BaseUsageConfig {
    /// Width of the aggregation buckets.
    pub bucket_duration: BucketDuration,
    /// Earliest event time to aggregate.
    pub start_time: Option<DateTime<Utc>>,
    /// Latest event time to aggregate.
    pub end_time: Option<DateTime<Utc>>,
    /// Number of top queries to save to each table.
    pub top_n_queries: TopNQueries,
    /// Regex patterns for user emails to filter in usage.
    pub user_email_pattern: AllowDenyPattern,
    /// Whether to display operational stats.
    pub include_operational_stats: bool,
    /// Whether to report read operational stats.
    pub include_read_operational_stats: bool,
    /// Whether to format sql queries.
    pub format_sql_queries: bool,
    /// Whether to ingest the top_n_queries.
    pub include_top_n_queries: bool,
}

impl Default for BaseUsageConfig {
    fn default() -> Self {
        Self {
            bucket_duration: BucketDuration::default(),
            start_time: None,
            end_time: None,
            top_n_queries: TopNQueries::default(),
            user_email_pattern: AllowDenyPattern::allow_all(),
            include_operational_stats: true,
            include_read_operational_stats: false,
            format_sql_queries: false,
            include_top_n_queries: true,
        }
    }
}

impl BaseUsageConfig {
    /// Parses and validates a config value.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Schema`] for unknown keys, wrong types, an
    /// out-of-range `top_n_queries` or an invalid email pattern.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| IngestError::Schema {
            what: "usage",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = BaseUsageConfig::from_value(json!({})).unwrap();
        assert_eq!(config.top_n_queries.get(), 10);
        assert_eq!(config.bucket_duration, BucketDuration::Day);
        assert!(config.include_top_n_queries);
        assert!(config.include_operational_stats);
        assert!(!config.format_sql_queries);
        assert!(config.user_email_pattern.allowed("anyone@example.com"));
    }

    #[test]
    fn test_top_n_limits() {
        assert_eq!(TopNQueries::MAX, 1200);
        assert!(TopNQueries::new(1200).is_ok());
        assert!(matches!(
            TopNQueries::new(2000),
            Err(IngestError::TopNQueries {
                value: 2000,
                max: 1200
            })
        ));
        assert!(TopNQueries::new(0).is_err());
    }

    #[test]
    fn test_top_n_rejected_at_parse_time() {
        let err = BaseUsageConfig::from_value(json!({"top_n_queries": 2000})).unwrap_err();
        assert!(matches!(err, IngestError::Schema { what: "usage", .. }));
    }

    #[test]
    fn test_full_config() {
        let config = BaseUsageConfig::from_value(json!({
            "bucket_duration": "HOUR",
            "top_n_queries": 5,
            "user_email_pattern": {"deny": ["svc_.*"]},
            "start_time": "2024-03-01T00:00:00Z",
            "format_sql_queries": true,
            "include_top_n_queries": false
        }))
        .unwrap();
        assert_eq!(config.bucket_duration, BucketDuration::Hour);
        assert_eq!(config.top_n_queries.get(), 5);
        assert!(!config.user_email_pattern.allowed("svc_etl@example.com"));
        assert!(config.start_time.is_some());
        assert!(config.format_sql_queries);
        assert!(!config.include_top_n_queries);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(BaseUsageConfig::from_value(json!({"top_n": 3})).is_err());
    }
}
