//! Domain name resolution.
//!
//! Glossary terms may name the domain they belong to either by urn or by a
//! human-readable name. Names are turned into urns through an upstream
//! [`DomainCatalog`].

use std::collections::HashMap;

use urnkit::make_domain_urn;

use crate::error::{IngestError, Result};

const DOMAIN_URN_PREFIX: &str = "urn:li:domain";

/// Upstream catalog lookups needed to resolve domain names.
pub trait DomainCatalog: Send + Sync {
    /// Whether properties exist for the domain `urn`.
    fn domain_properties_exist(&self, urn: &str) -> anyhow::Result<bool>;

    /// Finds the urn of the domain whose display name is `name`.
    fn domain_urn_by_name(&self, name: &str) -> anyhow::Result<Option<String>>;
}

/// Resolves a fixed set of domain identifiers once, then answers lookups.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    resolved: HashMap<String, String>,
}

impl DomainRegistry {
    /// Resolves every identifier in `cached_domains`.
    ///
    /// Identifiers that already are domain urns need no lookup. Any other
    /// identifier is tried first as the id of an existing domain, then as a
    /// domain name.
    ///
    /// # Errors
    ///
    /// Fails when a name needs resolution but no catalog is attached, when
    /// the catalog has no such domain, or when the catalog call fails.
    pub fn new(cached_domains: &[String], catalog: Option<&dyn DomainCatalog>) -> Result<Self> {
        let pending: Vec<&String> = cached_domains
            .iter()
            .filter(|d| !d.starts_with(DOMAIN_URN_PREFIX))
            .collect();

        let mut resolved = HashMap::new();
        if pending.is_empty() {
            return Ok(Self { resolved });
        }

        let Some(catalog) = catalog else {
            return Err(IngestError::Domain(format!(
                "Following domains need server-side resolution {pending:?} but a catalog \
                 connection wasn't provided. Either use fully qualified domain ids \
                 (e.g. urn:li:domain:ec428203-ce86-4db3-985d-5a8ee6df32ba) or configure a catalog."
            )));
        };

        for name in pending {
            let catalog_err = |e: anyhow::Error| IngestError::Catalog {
                name: name.clone(),
                source: e.into(),
            };

            let maybe_urn = make_domain_urn(name);
            if catalog
                .domain_properties_exist(&maybe_urn)
                .map_err(catalog_err)?
            {
                resolved.insert(name.clone(), maybe_urn);
                continue;
            }

            match catalog.domain_urn_by_name(name).map_err(catalog_err)? {
                Some(urn) => {
                    debug!("Resolved domain {name:?} to {urn}");
                    resolved.insert(name.clone(), urn);
                }
                None => {
                    error!("Failed to retrieve domain id for domain {name}");
                    return Err(IngestError::Domain(format!(
                        "domain {name} doesn't seem to be provisioned. Either create the \
                         domain or use an explicit domain urn."
                    )));
                }
            }
        }

        Ok(Self { resolved })
    }

    /// The urn for `domain`, or `domain` itself when it needed no resolution.
    pub fn get_domain_urn(&self, domain: &str) -> String {
        self.resolved
            .get(domain)
            .cloned()
            .unwrap_or_else(|| domain.to_string())
    }
}
