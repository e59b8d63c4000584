//! Glossary tree to change records.
//!
//! The tree is walked in declaration order. Every node yields a snapshot
//! followed by its knowledge links, then its child nodes, then its child
//! terms. Every term yields its domain assignment (if any), its snapshot and
//! its knowledge links. Owners flow down the tree: an entity without declared
//! owners takes the owners of its parent, and the top level takes the
//! glossary-wide owners.

use serde_json::json;
use urnkit::{UrnEncoder, datahub_guid, make_group_urn, make_user_urn};

use crate::{
    ctx::IngestContext,
    domain::DomainRegistry,
    error::Result,
    glossary::{
        config::{
            BusinessGlossaryConfig, GlossaryNodeConfig, GlossaryTermConfig, KnowledgeCard, Owners,
        },
        path_table::PathIdTable,
    },
    model::{
        Aspect, AuditStamp, ChangeProposal, ChangeRecord, Domains, GlossaryNodeInfo,
        GlossaryRelatedTerms, GlossaryTermInfo, InstitutionalMemory, InstitutionalMemoryMetadata,
        Owner, Ownership, OwnershipType, Snapshot, Status, WorkUnit,
    },
};

pub const GLOSSARY_NODE_URN_PREFIX: &str = "urn:li:glossaryNode:";
pub const GLOSSARY_TERM_URN_PREFIX: &str = "urn:li:glossaryTerm:";

/// Switches that change how the tree is flattened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Hash every derived id instead of using the dot-joined path.
    pub enable_auto_id: bool,
}

/// Derives the id of the entity at `path`.
///
/// A declared id always wins. Otherwise the path is joined with `.`; the
/// result is replaced by a content hash when auto ids are enabled or when it
/// contains a character reserved in urn ids.
pub fn create_id(path: &[&str], default_id: Option<&str>, enable_auto_id: bool) -> String {
    if let Some(id) = default_id {
        return id.to_string();
    }

    let id = path.join(".");
    if enable_auto_id || UrnEncoder::contains_reserved_char(&id) {
        datahub_guid(&json!({ "path": id }))
    } else {
        id
    }
}

fn make_urn(prefix: &str, path: &[&str], default_id: Option<&str>, enable_auto_id: bool) -> String {
    if let Some(id) = default_id.filter(|id| id.starts_with(prefix)) {
        debug!("{id} is already a urn, using it as is");
        return id.to_string();
    }
    format!("{prefix}{}", create_id(path, default_id, enable_auto_id))
}

pub fn make_glossary_node_urn(path: &[&str], default_id: Option<&str>, enable_auto_id: bool) -> String {
    make_urn(GLOSSARY_NODE_URN_PREFIX, path, default_id, enable_auto_id)
}

pub fn make_glossary_term_urn(path: &[&str], default_id: Option<&str>, enable_auto_id: bool) -> String {
    make_urn(GLOSSARY_TERM_URN_PREFIX, path, default_id, enable_auto_id)
}

/// Converts declared owners into an ownership aspect, users first.
pub fn get_owners(owners: &Owners) -> Ownership {
    let users = owners
        .users
        .iter()
        .flatten()
        .map(|u| make_user_urn(u));
    let groups = owners
        .groups
        .iter()
        .flatten()
        .map(|g| make_group_urn(g));

    Ownership {
        owners: users
            .chain(groups)
            .map(|owner| Owner {
                owner,
                owner_type: OwnershipType::Developer,
            })
            .collect(),
    }
}

/// Builds the institutional memory proposal for `urn`.
///
/// Cards missing a label or url are skipped. Returns `None` when no card
/// remains.
pub fn make_institutional_memory_mcp(
    urn: &str,
    knowledge_cards: &[KnowledgeCard],
    now_millis: i64,
) -> Result<Option<ChangeProposal>> {
    let elements: Vec<_> = knowledge_cards
        .iter()
        .filter_map(|card| match (card.label.as_deref(), card.url.as_deref()) {
            (Some(label), Some(url)) if !label.is_empty() && !url.is_empty() => {
                Some(InstitutionalMemoryMetadata {
                    url: url.to_string(),
                    description: label.to_string(),
                    create_stamp: AuditStamp::system(now_millis),
                })
            }
            _ => None,
        })
        .collect();

    if elements.is_empty() {
        return Ok(None);
    }
    ChangeProposal::new(urn, Aspect::InstitutionalMemory(InstitutionalMemory { elements })).map(Some)
}

/// Flattens `glossary`, building its path table first.
pub fn flatten(
    glossary: &BusinessGlossaryConfig,
    options: &FlattenOptions,
    ctx: &IngestContext,
) -> Result<Vec<WorkUnit>> {
    let table = PathIdTable::populate(glossary);
    flatten_with_table(glossary, &table, options, ctx)
}

/// Flattens `glossary` against an already populated path table.
///
/// # Errors
///
/// Fails when a term's domain cannot be resolved or a declared id does not
/// form a valid urn. Nothing is returned in that case.
pub fn flatten_with_table(
    glossary: &BusinessGlossaryConfig,
    table: &PathIdTable,
    options: &FlattenOptions,
    ctx: &IngestContext,
) -> Result<Vec<WorkUnit>> {
    let domains = collect_domains(glossary);
    let registry = DomainRegistry::new(&domains, ctx.catalog())?;

    let mut emitter = Emitter {
        defaults: glossary,
        table,
        registry: &registry,
        enable_auto_id: options.enable_auto_id,
        ctx,
        units: Vec::new(),
    };

    let root_owners = get_owners(&glossary.owners);
    for node in glossary.nodes.iter().flatten() {
        emitter.node(node, vec![node.name.as_str()], None, &root_owners)?;
    }
    for term in glossary.terms.iter().flatten() {
        emitter.term(term, vec![term.name.as_str()], None, &root_owners)?;
    }

    Ok(emitter.units)
}

fn collect_domains(glossary: &BusinessGlossaryConfig) -> Vec<String> {
    fn from_terms(terms: &Option<Vec<GlossaryTermConfig>>, out: &mut Vec<String>) {
        out.extend(terms.iter().flatten().filter_map(|t| t.domain.clone()));
    }
    fn from_node(node: &GlossaryNodeConfig, out: &mut Vec<String>) {
        from_terms(&node.terms, out);
        for child in node.nodes.iter().flatten() {
            from_node(child, out);
        }
    }

    let mut out = Vec::new();
    for node in glossary.nodes.iter().flatten() {
        from_node(node, &mut out);
    }
    from_terms(&glossary.terms, &mut out);
    out.sort();
    out.dedup();
    out
}

struct Emitter<'a> {
    defaults: &'a BusinessGlossaryConfig,
    table: &'a PathIdTable,
    registry: &'a DomainRegistry,
    enable_auto_id: bool,
    ctx: &'a IngestContext,
    units: Vec<WorkUnit>,
}

impl Emitter<'_> {
    fn push(&mut self, record: ChangeRecord) {
        self.units.push(record.into());
    }

    fn knowledge_links(&mut self, urn: &str, links: Option<&Vec<KnowledgeCard>>) -> Result<()> {
        let Some(links) = links else {
            return Ok(());
        };
        if let Some(mcp) = make_institutional_memory_mcp(urn, links, self.ctx.clock.now_millis())? {
            self.push(ChangeRecord::Proposal(mcp));
        }
        Ok(())
    }

    fn node(
        &mut self,
        node: &GlossaryNodeConfig,
        path: Vec<&str>,
        parent_node: Option<&str>,
        parent_owners: &Ownership,
    ) -> Result<()> {
        let urn = make_glossary_node_urn(&path, node.id.as_deref(), self.enable_auto_id);
        let owners = node.owners.as_ref().map(get_owners);
        let owners = owners.as_ref().unwrap_or(parent_owners);

        self.push(ChangeRecord::Snapshot(Snapshot {
            urn: urn.clone(),
            aspects: vec![
                Aspect::GlossaryNodeInfo(GlossaryNodeInfo {
                    definition: node.description.clone(),
                    parent_node: parent_node.map(str::to_string),
                    name: node.name.clone(),
                }),
                Aspect::Ownership(owners.clone()),
                Aspect::Status(Status::VALID),
            ],
        }));
        self.knowledge_links(&urn, node.knowledge_links.as_ref())?;

        for child in node.nodes.iter().flatten() {
            let child_path = [path.as_slice(), &[child.name.as_str()]].concat();
            self.node(child, child_path, Some(&urn), owners)?;
        }
        for term in node.terms.iter().flatten() {
            let term_path = [path.as_slice(), &[term.name.as_str()]].concat();
            self.term(term, term_path, Some(&urn), owners)?;
        }
        Ok(())
    }

    fn related(&self, names: Option<&Vec<String>>) -> Option<Vec<String>> {
        names.map(|names| {
            names
                .iter()
                .map(|name| {
                    make_glossary_term_urn(&[name.as_str()], self.table.get(name), self.enable_auto_id)
                })
                .collect()
        })
    }

    fn term(
        &mut self,
        term: &GlossaryTermConfig,
        path: Vec<&str>,
        parent_node: Option<&str>,
        parent_owners: &Ownership,
    ) -> Result<()> {
        let urn = make_glossary_term_urn(&path, term.id.as_deref(), self.enable_auto_id);
        let defaults = self.defaults;

        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();
        let mut aspects = vec![Aspect::GlossaryTermInfo(GlossaryTermInfo {
            definition: term.description.clone(),
            term_source: term
                .term_source
                .clone()
                .unwrap_or_else(|| defaults.source_type.clone()),
            source_ref: non_empty(&term.source_ref).or_else(|| Some(defaults.source.clone())),
            source_url: non_empty(&term.source_url).or_else(|| defaults.url.clone()),
            parent_node: parent_node.map(str::to_string),
            custom_properties: term.custom_properties.clone(),
            name: term.name.clone(),
        })];

        let related = GlossaryRelatedTerms {
            is_related_terms: self.related(term.inherits.as_ref()),
            has_related_terms: self.related(term.contains.as_ref()),
            values: self.related(term.values.as_ref()),
            related_terms: self.related(term.related_terms.as_ref()),
        };
        if related != GlossaryRelatedTerms::default() {
            aspects.push(Aspect::GlossaryRelatedTerms(related));
        }

        let owners = term.owners.as_ref().map(get_owners);
        aspects.push(Aspect::Ownership(owners.unwrap_or_else(|| parent_owners.clone())));

        if let Some(domain) = &term.domain {
            let domains = Domains {
                domains: vec![self.registry.get_domain_urn(domain)],
            };
            let mcp = ChangeProposal::new(urn.clone(), Aspect::Domains(domains))?;
            self.push(ChangeRecord::Proposal(mcp));
        }

        self.push(ChangeRecord::Snapshot(Snapshot {
            urn: urn.clone(),
            aspects,
        }));
        self.knowledge_links(&urn, term.knowledge_links.as_ref())
    }
}
