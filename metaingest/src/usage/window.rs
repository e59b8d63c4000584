//! Time buckets for usage aggregation.

use chrono::{DateTime, Duration, DurationRound, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Width of a usage aggregation bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BucketDuration {
    #[default]
    Day,
    Hour,
}

impl BucketDuration {
    /// Length of one bucket.
    pub fn delta(self) -> Duration {
        match self {
            BucketDuration::Day => Duration::days(1),
            BucketDuration::Hour => Duration::hours(1),
        }
    }

    /// Start of the bucket containing `ts`.
    pub fn bucket_start(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        // Both widths divide the epoch evenly, so this cannot fail in range.
        ts.duration_trunc(self.delta()).unwrap_or(ts)
    }
}

/// Start and end of the window to ingest usage for.
///
/// `end` defaults to `now`; `start` defaults to one bucket before the start
/// of the bucket containing `end`.
pub fn time_window(
    bucket_duration: BucketDuration,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = end_time.unwrap_or(now);
    let start =
        start_time.unwrap_or_else(|| bucket_duration.bucket_start(end) - bucket_duration.delta());
    (start, end)
}
