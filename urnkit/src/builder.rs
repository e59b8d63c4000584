//! URN construction helpers.
//!
//! Every builder is idempotent: passing a value that already carries the
//! target prefix returns it unchanged.

use crate::{
    URN_PREFIX,
    error::{Result, UrnError},
};

const CORP_USER: &str = "urn:li:corpuser:";
const CORP_GROUP: &str = "urn:li:corpGroup:";
const DOMAIN: &str = "urn:li:domain:";
const DATA_PLATFORM: &str = "urn:li:dataPlatform:";

fn with_prefix(prefix: &str, value: &str) -> String {
    if value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{prefix}{value}")
    }
}

/// Builds `urn:li:corpuser:<username>`.
pub fn make_user_urn(username: &str) -> String {
    with_prefix(CORP_USER, username)
}

/// Builds `urn:li:corpGroup:<groupname>`.
pub fn make_group_urn(groupname: &str) -> String {
    with_prefix(CORP_GROUP, groupname)
}

/// Builds `urn:li:domain:<id>`.
pub fn make_domain_urn(domain: &str) -> String {
    with_prefix(DOMAIN, domain)
}

/// Builds `urn:li:dataPlatform:<platform>`.
pub fn make_data_platform_urn(platform: &str) -> String {
    with_prefix(DATA_PLATFORM, platform)
}

/// Builds `urn:li:dataset:(<platform urn>,<name>,<env>)`.
pub fn make_dataset_urn(platform: &str, name: &str, env: &str) -> String {
    format!(
        "urn:li:dataset:({},{name},{env})",
        make_data_platform_urn(platform)
    )
}

/// Returns the entity type segment of a URN, e.g. `glossaryTerm`.
///
/// # Errors
///
/// Returns [`UrnError::Malformed`] when `urn` is not `urn:li:<type>:<id>`.
pub fn entity_type_of_urn(urn: &str) -> Result<&str> {
    urn.strip_prefix(URN_PREFIX)
        .and_then(|rest| rest.split_once(':'))
        .map(|(entity_type, _)| entity_type)
        .filter(|entity_type| !entity_type.is_empty())
        .ok_or_else(|| UrnError::Malformed(urn.to_string()))
}
