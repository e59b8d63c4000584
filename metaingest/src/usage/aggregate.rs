//! Per-resource usage aggregation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    model::{
        Aspect, ChangeProposal, ChangeRecord, DatasetFieldUsageCounts, DatasetUsageStatistics,
        DatasetUserUsageCounts, TimeWindowSize, WorkUnit,
    },
    usage::{
        AllowDenyPattern, BaseUsageConfig, BucketDuration, QueryFormatter, TopNQueries,
        config::{DEFAULT_QUERY_TRIMMER, TOTAL_BUDGET_FOR_QUERY_LIST},
        trim_query,
    },
};

/// Insertion-ordered frequency counter.
///
/// [`most_common`](Self::most_common) orders by descending count; equal
/// counts keep the order in which keys were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyCounter {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of `key` by one.
    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Count for `key`, 0 when never seen.
    pub fn get(&self, key: &str) -> u64 {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending count, at most `n` of them when given.
    pub fn most_common(&self, n: Option<usize>) -> Vec<(String, u64)> {
        let mut sorted = self.entries.clone();
        // Stable sort keeps first-seen order among equal counts.
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(n) = n {
            sorted.truncate(n);
        }
        sorted
    }
}

/// Settings applied when turning an aggregate into a usage record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecordOptions {
    pub bucket_duration: BucketDuration,
    pub top_n_queries: TopNQueries,
    pub format_sql_queries: bool,
    pub include_top_n_queries: bool,
    /// Characters shared by all top queries of one record.
    pub total_budget_for_query_list: usize,
    /// Suffix appended to trimmed queries.
    pub query_trimmer_string: String,
}

impl Default for UsageRecordOptions {
    fn default() -> Self {
        Self::from(&BaseUsageConfig::default())
    }
}

impl From<&BaseUsageConfig> for UsageRecordOptions {
    fn from(config: &BaseUsageConfig) -> Self {
        Self {
            bucket_duration: config.bucket_duration,
            top_n_queries: config.top_n_queries,
            format_sql_queries: config.format_sql_queries,
            include_top_n_queries: config.include_top_n_queries,
            total_budget_for_query_list: TOTAL_BUDGET_FOR_QUERY_LIST,
            query_trimmer_string: DEFAULT_QUERY_TRIMMER.to_string(),
        }
    }
}

/// Usage counters for one resource over one time bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericAggregatedDataset<R> {
    pub bucket_start_time: DateTime<Utc>,
    pub resource: R,
    pub read_count: u64,
    pub query_count: u64,
    pub query_freq: FrequencyCounter,
    pub user_freq: FrequencyCounter,
    pub column_freq: FrequencyCounter,
}

impl<R> GenericAggregatedDataset<R> {
    pub fn new(bucket_start_time: DateTime<Utc>, resource: R) -> Self {
        Self {
            bucket_start_time,
            resource,
            read_count: 0,
            query_count: 0,
            query_freq: FrequencyCounter::new(),
            user_freq: FrequencyCounter::new(),
            column_freq: FrequencyCounter::new(),
        }
    }

    /// Records one read of the resource.
    ///
    /// Reads by users rejected by `user_email_pattern` are ignored. An empty
    /// query text counts as no query. Every entry of `fields` is counted,
    /// duplicates included.
    pub fn add_read_entry(
        &mut self,
        user_email: &str,
        query: Option<&str>,
        fields: &[String],
        user_email_pattern: &AllowDenyPattern,
    ) {
        if !user_email_pattern.allowed(user_email) {
            return;
        }

        self.read_count += 1;
        self.user_freq.add(user_email);

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            self.query_count += 1;
            self.query_freq.add(query);
        }
        for column in fields {
            self.column_freq.add(column);
        }
    }

    /// Builds the usage-statistics work unit for this aggregate.
    ///
    /// # Errors
    ///
    /// Fails when a top query must be trimmed below the trimmer length, or
    /// when `urn_builder` yields a malformed urn.
    pub fn make_usage_workunit(
        &self,
        options: &UsageRecordOptions,
        urn_builder: impl Fn(&R) -> String,
        formatter: &dyn QueryFormatter,
    ) -> Result<WorkUnit> {
        let top_sql_queries = if options.include_top_n_queries {
            let budget_per_query =
                options.total_budget_for_query_list / options.top_n_queries.get();
            let queries = self
                .query_freq
                .most_common(Some(options.top_n_queries.get()))
                .into_iter()
                .map(|(query, _)| {
                    let query = if options.format_sql_queries {
                        formatter.format(&query)
                    } else {
                        query
                    };
                    trim_query(&query, budget_per_query, &options.query_trimmer_string)
                })
                .collect::<Result<Vec<_>>>()?;
            Some(queries)
        } else {
            None
        };

        let user_counts = self
            .user_freq
            .most_common(None)
            .into_iter()
            .map(|(email, count)| DatasetUserUsageCounts {
                user: urnkit::make_user_urn(email.split('@').next().unwrap_or_default()),
                count,
                user_email: email,
            })
            .collect::<Vec<_>>();

        let field_counts = self
            .column_freq
            .most_common(None)
            .into_iter()
            .map(|(field_path, count)| DatasetFieldUsageCounts { field_path, count })
            .collect();

        let stats = DatasetUsageStatistics {
            timestamp_millis: self.bucket_start_time.timestamp_millis(),
            event_granularity: TimeWindowSize {
                unit: options.bucket_duration,
                multiple: 1,
            },
            unique_user_count: user_counts.len() as u64,
            total_sql_queries: self.query_count,
            top_sql_queries,
            user_counts,
            field_counts,
        };

        let proposal = ChangeProposal::new(
            urn_builder(&self.resource),
            Aspect::DatasetUsageStatistics(stats),
        )?;
        Ok(ChangeRecord::Proposal(proposal).into())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::usage::{CollapseWhitespace, PatternSpec};

    fn bucket() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap()
    }

    fn dataset_urn(name: &String) -> String {
        urnkit::make_dataset_urn("hive", name, "PROD")
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn stats(unit: &WorkUnit) -> &DatasetUsageStatistics {
        let ChangeRecord::Proposal(p) = &unit.record else {
            panic!("expected a proposal");
        };
        let Aspect::DatasetUsageStatistics(s) = &p.aspect else {
            panic!("expected usage statistics");
        };
        s
    }

    #[test]
    fn test_counter_ordering() {
        let mut counter = FrequencyCounter::new();
        for key in ["b", "a", "c", "a", "c"] {
            counter.add(key);
        }
        assert_eq!(
            counter.most_common(None),
            vec![("a".into(), 2), ("c".into(), 2), ("b".into(), 1)]
        );
        assert_eq!(counter.most_common(Some(1)), vec![("a".into(), 2)]);
        assert_eq!(counter.get("missing"), 0);
        assert_eq!(counter.len(), 3);
    }

    #[test]
    fn test_same_user_three_times() {
        let mut agg = GenericAggregatedDataset::new(bucket(), "db.orders".to_string());
        let pattern = AllowDenyPattern::allow_all();
        for _ in 0..3 {
            agg.add_read_entry("alice@example.com", None, &[], &pattern);
        }
        assert_eq!(agg.read_count, 3);
        assert_eq!(agg.user_freq.get("alice@example.com"), 3);
        assert_eq!(agg.query_count, 0);
    }

    #[test]
    fn test_denied_user_is_ignored() {
        let mut agg = GenericAggregatedDataset::new(bucket(), "db.orders".to_string());
        let pattern = AllowDenyPattern::new(PatternSpec {
            deny: vec!["svc_.*".into()],
            ..Default::default()
        })
        .unwrap();
        agg.add_read_entry(
            "svc_loader@example.com",
            Some("select 1"),
            &fields(&["id"]),
            &pattern,
        );
        assert_eq!(
            agg,
            GenericAggregatedDataset::new(bucket(), "db.orders".to_string())
        );
    }

    #[test]
    fn test_counts_queries_and_duplicate_fields() {
        let mut agg = GenericAggregatedDataset::new(bucket(), "db.orders".to_string());
        let pattern = AllowDenyPattern::allow_all();
        agg.add_read_entry(
            "alice@example.com",
            Some("select id from orders"),
            &fields(&["id", "id", "total"]),
            &pattern,
        );
        agg.add_read_entry("bob@example.com", Some(""), &fields(&["total"]), &pattern);
        assert_eq!(agg.read_count, 2);
        assert_eq!(agg.query_count, 1);
        assert_eq!(agg.column_freq.get("id"), 2);
        assert_eq!(agg.column_freq.get("total"), 2);
    }

    #[test]
    fn test_usage_workunit() {
        let mut agg = GenericAggregatedDataset::new(bucket(), "db.orders".to_string());
        let pattern = AllowDenyPattern::allow_all();
        agg.add_read_entry("bob@example.com", Some("select 2"), &fields(&["b"]), &pattern);
        agg.add_read_entry("alice@example.com", Some("select 1"), &fields(&["a"]), &pattern);
        agg.add_read_entry("alice@example.com", Some("select 1"), &fields(&["a"]), &pattern);

        let unit = agg
            .make_usage_workunit(&UsageRecordOptions::default(), dataset_urn, &CollapseWhitespace)
            .unwrap();
        assert_eq!(
            unit.id,
            "dataset-datasetUsageStatistics-urn:li:dataset:(urn:li:dataPlatform:hive,db.orders,PROD)"
        );

        let stats = stats(&unit);
        assert_eq!(stats.timestamp_millis, bucket().timestamp_millis());
        assert_eq!(stats.unique_user_count, 2);
        assert_eq!(stats.total_sql_queries, 3);
        assert_eq!(
            stats.top_sql_queries.as_deref(),
            Some(&["select 1".to_string(), "select 2".to_string()][..])
        );
        assert_eq!(stats.user_counts[0].user, "urn:li:corpuser:alice");
        assert_eq!(stats.user_counts[0].user_email, "alice@example.com");
        assert_eq!(stats.user_counts[0].count, 2);
        assert_eq!(stats.user_counts[1].user, "urn:li:corpuser:bob");
        assert_eq!(stats.field_counts[0].field_path, "a");
    }

    #[test]
    fn test_top_queries_formatted_and_trimmed() {
        let mut agg = GenericAggregatedDataset::new(bucket(), "db.orders".to_string());
        let pattern = AllowDenyPattern::allow_all();
        agg.add_read_entry(
            "alice@example.com",
            Some("select   id,\n  total\nfrom orders where total > 100"),
            &[],
            &pattern,
        );

        let options = UsageRecordOptions {
            top_n_queries: TopNQueries::new(2).unwrap(),
            format_sql_queries: true,
            total_budget_for_query_list: 40,
            ..Default::default()
        };
        let unit = agg
            .make_usage_workunit(&options, dataset_urn, &CollapseWhitespace)
            .unwrap();
        assert_eq!(
            stats(&unit).top_sql_queries.as_deref(),
            Some(&["select id, total ...".to_string()][..])
        );
    }

    #[test]
    fn test_top_queries_excluded() {
        let mut agg = GenericAggregatedDataset::new(bucket(), "db.orders".to_string());
        agg.add_read_entry(
            "alice@example.com",
            Some("select 1"),
            &[],
            &AllowDenyPattern::allow_all(),
        );
        let options = UsageRecordOptions {
            include_top_n_queries: false,
            bucket_duration: BucketDuration::Hour,
            ..Default::default()
        };
        let unit = agg
            .make_usage_workunit(&options, dataset_urn, &CollapseWhitespace)
            .unwrap();
        let stats = stats(&unit);
        assert!(stats.top_sql_queries.is_none());
        assert_eq!(stats.total_sql_queries, 1);
        assert_eq!(stats.event_granularity.unit, BucketDuration::Hour);
    }
}
