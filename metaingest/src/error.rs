use thiserror::Error;

/// Errors raised while validating or converting ingestion input.
///
/// All of them are configuration errors: they are reported before any
/// change record leaves the crate.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Loading the config document failed.
    #[error(transparent)]
    Config(#[from] confres::ConfigError),

    /// The document does not match the expected shape.
    #[error("invalid {what} config")]
    Schema {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The glossary declares an unsupported format version.
    #[error("Only version 1 is supported, got {0:?}")]
    UnsupportedVersion(String),

    /// `top_n_queries` is zero or leaves less than the minimum per-query budget.
    #[error("top_n_queries is set to {value} but it can be maximum {max}")]
    TopNQueries { value: u64, max: u64 },

    /// A regular expression in an allow/deny pattern does not compile.
    #[error("invalid pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The per-query character budget cannot fit the trimming suffix.
    #[error("Budget per query ({budget}) is too low. Please, decrease the number of top_n_queries.")]
    QueryBudget { budget: usize },

    /// A domain name could not be turned into a domain urn.
    #[error("{0}")]
    Domain(String),

    /// The upstream catalog failed while resolving a domain.
    #[error("domain lookup for {name:?} failed")]
    Catalog {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error(transparent)]
    Urn(#[from] urnkit::UrnError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
