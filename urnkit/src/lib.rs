//! # urnkit - URN helpers
//!
//! Builders and checks for the `urn:li:<entityType>:<id>` identifiers used by
//! the metadata catalog, plus the content-hash id generator used when an
//! entity has no stable human-readable id.
//!
//! ## Quick Start
//!
//! ```rust
//! use urnkit::{datahub_guid, make_user_urn, UrnEncoder};
//!
//! assert_eq!(make_user_urn("jdoe"), "urn:li:corpuser:jdoe");
//! assert!(UrnEncoder::contains_reserved_char("a,b"));
//!
//! let id = datahub_guid(&serde_json::json!({"path": "Finance.Revenue"}));
//! assert_eq!(id.len(), 32);
//! ```
//!
//! ## Modules
//!
//! - [`builder`] - URN construction for users, groups, domains and datasets
//! - [`encoder`] - Reserved character detection
//! - [`guid`] - Content-hash identifiers
//! - [`error`] - Error types

/// URN construction helpers.
pub mod builder;

/// Reserved character detection for URN ids.
pub mod encoder;

/// Error types and result definitions.
pub mod error;

/// Deterministic content-hash identifiers.
pub mod guid;

pub use builder::{
    entity_type_of_urn, make_data_platform_urn, make_dataset_urn, make_domain_urn,
    make_group_urn, make_user_urn,
};
pub use encoder::UrnEncoder;
pub use error::{Result, UrnError};
pub use guid::datahub_guid;

/// Common prefix of every catalog URN.
pub const URN_PREFIX: &str = "urn:li:";
