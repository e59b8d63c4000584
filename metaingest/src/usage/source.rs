//! File-driven usage source.
//!
//! Reads a document of raw read events, aggregates them per resource and
//! bucket, and emits one usage-statistics work unit per aggregate.
//!
//! ```yaml
//! platform: hive
//! env: PROD
//! config:
//!   bucket_duration: DAY
//!   top_n_queries: 5
//! events:
//!   - resource: db.orders
//!     timestamp: 2024-03-09T10:15:00Z
//!     user_email: alice@example.com
//!     query: select id from orders
//!     fields: [id]
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    ctx::IngestContext,
    error::{IngestError, Result},
    model::WorkUnit,
    usage::{
        BaseUsageConfig, GenericAggregatedDataset, QueryFormatter, UsageRecordOptions,
        time_window,
    },
};

/// One read of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadEvent {
    /// Dataset name on the platform.
    pub resource: String,
    pub timestamp: DateTime<Utc>,
    pub user_email: String,
    #[serde(default)]
    pub query: Option<String>,
    /// Columns read by the query.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// A usage events document.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UsageEventsFile {
    /// Data platform of every resource, e.g. `hive`.
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Fabric of every resource, e.g. `PROD`.
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default)]
    pub config: BaseUsageConfig,
    #[serde(default)]
    pub events: Vec<ReadEvent>,
}

fn default_platform() -> String {
    "file".to_string()
}

fn default_env() -> String {
    "PROD".to_string()
}

impl UsageEventsFile {
    /// Parses and validates a loaded document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| IngestError::Schema {
            what: "usage events",
            source,
        })
    }

    /// Aggregates the events inside the configured time window.
    ///
    /// Work units are ordered by bucket start, then resource name.
    pub fn workunits(
        &self,
        ctx: &IngestContext,
        formatter: &dyn QueryFormatter,
    ) -> Result<Vec<WorkUnit>> {
        let config = &self.config;
        let now = DateTime::from_timestamp_millis(ctx.clock.now_millis()).unwrap_or_default();
        let (start, end) = time_window(config.bucket_duration, config.start_time, config.end_time, now);

        let mut aggregated: BTreeMap<(DateTime<Utc>, &str), GenericAggregatedDataset<String>> =
            BTreeMap::new();
        let mut skipped = 0usize;

        for event in &self.events {
            if event.timestamp < start || event.timestamp >= end {
                skipped += 1;
                continue;
            }
            let bucket = config.bucket_duration.bucket_start(event.timestamp);
            aggregated
                .entry((bucket, event.resource.as_str()))
                .or_insert_with(|| GenericAggregatedDataset::new(bucket, event.resource.clone()))
                .add_read_entry(
                    &event.user_email,
                    event.query.as_deref(),
                    &event.fields,
                    &config.user_email_pattern,
                );
        }

        if skipped > 0 {
            debug!("[{}] {skipped} events outside {start} .. {end}", ctx.run_id);
        }

        let options = UsageRecordOptions::from(config);
        let units = aggregated
            .values()
            .map(|agg| {
                agg.make_usage_workunit(
                    &options,
                    |name| urnkit::make_dataset_urn(&self.platform, name, &self.env),
                    formatter,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        info!("[{}] Produced {} usage work units", ctx.run_id, units.len());
        Ok(units)
    }
}
