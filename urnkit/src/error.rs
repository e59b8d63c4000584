use thiserror::Error;

/// Errors raised while inspecting URNs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrnError {
    /// The string does not have the `urn:li:<type>:<id>` shape.
    #[error("malformed urn: {0:?}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, UrnError>;
