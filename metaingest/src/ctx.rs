//! Ingestion context.
//!
//! The [`IngestContext`] carries the collaborators shared by every source in
//! one ingestion run: a clock for audit stamps and an optional connection to
//! the upstream catalog used for domain resolution.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::DomainCatalog;

/// Millisecond wall clock.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Shared state for one ingestion run.
#[derive(Clone)]
pub struct IngestContext {
    /// Identifier of the run, used in log lines.
    pub run_id: String,
    /// Clock used for audit stamps.
    pub clock: Arc<dyn Clock>,
    /// Upstream catalog connection, if any.
    pub catalog: Option<Arc<dyn DomainCatalog>>,
}

impl Default for IngestContext {
    fn default() -> Self {
        Self {
            run_id: format!("file-ingest-{}", Utc::now().format("%Y_%m_%d-%H_%M_%S")),
            clock: Arc::new(SystemClock),
            catalog: None,
        }
    }
}

impl IngestContext {
    /// Replaces the clock, builder style.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Attaches an upstream catalog, builder style.
    pub fn with_catalog(mut self, catalog: impl DomainCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// The attached catalog as a plain reference.
    pub fn catalog(&self) -> Option<&dyn DomainCatalog> {
        self.catalog.as_deref()
    }
}
