//! Usage statistics aggregation.
//!
//! Read events are accumulated per resource and time bucket in a
//! [`GenericAggregatedDataset`], then turned into one usage-statistics
//! change proposal carrying user, field and top-query frequencies.
//!
//! - [`aggregate`] - Frequency counters and the per-bucket aggregate
//! - [`config`] - Usage configuration and its validation
//! - [`pattern`] - Allow/deny regex filters for user emails
//! - [`source`] - Aggregation of an event file
//! - [`trim`] - Query formatting and trimming
//! - [`window`] - Time buckets

pub mod aggregate;
pub mod config;
pub mod pattern;
pub mod source;
pub mod trim;
pub mod window;

pub use aggregate::{FrequencyCounter, GenericAggregatedDataset, UsageRecordOptions};
pub use config::{BaseUsageConfig, TOTAL_BUDGET_FOR_QUERY_LIST, TopNQueries};
pub use pattern::{AllowDenyPattern, PatternSpec};
pub use source::{ReadEvent, UsageEventsFile};
pub use trim::{CollapseWhitespace, QueryFormatter, trim_query};
pub use window::{BucketDuration, time_window};
