//! # metaingest
//!
//! Turns business glossary files and usage logs into metadata change
//! events for a downstream catalog.
//!
//! ## Features
//!
//! - **Glossary flattening**: nodes and terms become entity snapshots with
//!   stable ids, inherited owners, related terms, domains and knowledge links
//! - **Usage aggregation**: per-resource, per-bucket read statistics with a
//!   budgeted top-N query list
//! - **Config loading**: YAML/TOML from paths, URLs or stdin with
//!   environment-variable interpolation, via [`confres`]
//!
//! ## Modules
//!
//! - [`ctx`] - Clock and catalog collaborators shared by a run
//! - [`domain`] - Domain name resolution
//! - [`glossary`] - Business glossary source
//! - [`model`] - Change records and aspects
//! - [`usage`] - Usage statistics aggregation
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust
//! use metaingest::{
//!     ctx::{FixedClock, IngestContext},
//!     glossary::{BusinessGlossaryConfig, FlattenOptions, flatten},
//! };
//!
//! let glossary = BusinessGlossaryConfig::from_value(serde_json::json!({
//!     "version": 1,
//!     "source": "DataHub",
//!     "owners": {"users": ["mjames"]},
//!     "terms": [{"name": "Revenue", "description": "Money in"}]
//! }))
//! .unwrap();
//!
//! let ctx = IngestContext::default().with_clock(FixedClock(0));
//! let units = flatten(&glossary, &FlattenOptions::default(), &ctx).unwrap();
//! assert_eq!(units[0].id, "urn:li:glossaryTerm:Revenue");
//! ```

/// Clock and catalog collaborators for one ingestion run.
pub mod ctx;

/// Domain name to urn resolution.
pub mod domain;

/// Error types and result definitions.
pub mod error;

/// Business glossary loading and flattening.
pub mod glossary;

/// Change records emitted to the catalog.
pub mod model;

/// Usage statistics aggregation.
pub mod usage;

#[macro_use]
extern crate log;

pub use error::{IngestError, Result};
pub use model::{ChangeRecord, WorkUnit};
