use std::path::PathBuf;

use thiserror::Error;

use crate::loader::ConfigFormat;

/// Boxed cause attached to collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal configuration errors raised while locating or parsing a document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file extension maps to no supported format.
    #[error("Only .toml and .yml are supported. Cannot process file type {0:?}")]
    UnsupportedFileType(String),

    /// A local file is missing or unreadable.
    #[error("Cannot open config file {}", path.display())]
    CannotOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fetching a remote document failed.
    #[error("Cannot read remote file {url}")]
    RemoteFetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Reading standard input failed.
    #[error("Cannot read config from stdin")]
    Stdin(#[source] std::io::Error),

    /// The document text is not valid for its format.
    #[error("Failed to parse {format} config")]
    Parse {
        format: ConfigFormat,
        #[source]
        source: BoxError,
    },

    /// The document parsed but violates a structural requirement.
    #[error("{0}")]
    Invalid(String),
}

/// Failures of the placeholder expansion engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A referenced variable is not set and the policy forbids that.
    #[error("{name}: unbound variable")]
    Unbound { name: String },

    /// `${NAME:?message}` or `${NAME?message}` failed its check.
    #[error("{name}: {message}")]
    NullOrUnset { name: String, message: String },

    /// A `${` opened without a matching `}`.
    #[error("missing '}}' in {input:?}")]
    UnterminatedBrace { input: String },

    /// The brace contents are not a recognised parameter expression.
    #[error("bad substitution: ${{{expr}}}")]
    BadSubstitution { expr: String },
}
