//! Change-record model.
//!
//! A minimal, serializable rendition of the catalog's change events: full
//! entity snapshots ([`Snapshot`]) and single-aspect change proposals
//! ([`ChangeProposal`]), each wrapped in a [`WorkUnit`] with a stable id for
//! de-duplication downstream.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{error::Result, usage::BucketDuration};

/// Actor recorded on audit stamps produced by ingestion.
pub const SYSTEM_ACTOR: &str = "urn:li:corpuser:datahub";

/// Message recorded on audit stamps produced by ingestion.
pub const SYSTEM_MESSAGE: &str = "ingestion bot";

/// Kind of ownership attached to an owner entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipType {
    Developer,
}

/// One owner of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    /// User or group urn.
    pub owner: String,
    #[serde(rename = "type")]
    pub owner_type: OwnershipType,
}

/// Ownership aspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ownership {
    pub owners: Vec<Owner>,
}

/// Soft-delete status aspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub removed: bool,
}

impl Status {
    /// Status of a live entity.
    pub const VALID: Status = Status { removed: false };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryNodeInfo {
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTermInfo {
    pub definition: String,
    pub term_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<BTreeMap<String, String>>,
    pub name: String,
}

/// Relations from a term to other terms, each slot optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryRelatedTerms {
    /// `inherits`: this term is a kind of the targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_related_terms: Option<Vec<String>>,
    /// `contains`: this term has the targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_related_terms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_terms: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditStamp {
    pub time: i64,
    pub actor: String,
    pub message: String,
}

impl AuditStamp {
    /// A stamp attributed to the ingestion system actor.
    pub fn system(time: i64) -> Self {
        Self {
            time,
            actor: SYSTEM_ACTOR.to_string(),
            message: SYSTEM_MESSAGE.to_string(),
        }
    }
}

/// One link in an entity's institutional memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionalMemoryMetadata {
    pub url: String,
    pub description: String,
    pub create_stamp: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstitutionalMemory {
    pub elements: Vec<InstitutionalMemoryMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domains {
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindowSize {
    pub unit: BucketDuration,
    pub multiple: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetUserUsageCounts {
    pub user: String,
    pub count: u64,
    pub user_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFieldUsageCounts {
    pub field_path: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetUsageStatistics {
    pub timestamp_millis: i64,
    pub event_granularity: TimeWindowSize,
    pub unique_user_count: u64,
    pub total_sql_queries: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_sql_queries: Option<Vec<String>>,
    pub user_counts: Vec<DatasetUserUsageCounts>,
    pub field_counts: Vec<DatasetFieldUsageCounts>,
}

/// A single metadata aspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Aspect {
    GlossaryNodeInfo(GlossaryNodeInfo),
    GlossaryTermInfo(GlossaryTermInfo),
    GlossaryRelatedTerms(GlossaryRelatedTerms),
    Ownership(Ownership),
    Status(Status),
    InstitutionalMemory(InstitutionalMemory),
    Domains(Domains),
    DatasetUsageStatistics(DatasetUsageStatistics),
}

impl Aspect {
    /// The aspect's catalog name.
    pub fn name(&self) -> &'static str {
        match self {
            Aspect::GlossaryNodeInfo(_) => "glossaryNodeInfo",
            Aspect::GlossaryTermInfo(_) => "glossaryTermInfo",
            Aspect::GlossaryRelatedTerms(_) => "glossaryRelatedTerms",
            Aspect::Ownership(_) => "ownership",
            Aspect::Status(_) => "status",
            Aspect::InstitutionalMemory(_) => "institutionalMemory",
            Aspect::Domains(_) => "domains",
            Aspect::DatasetUsageStatistics(_) => "datasetUsageStatistics",
        }
    }
}

/// Full snapshot of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub urn: String,
    pub aspects: Vec<Aspect>,
}

/// Proposal to upsert a single aspect of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProposal {
    pub entity_type: String,
    pub entity_urn: String,
    pub aspect_name: String,
    pub aspect: Aspect,
}

impl ChangeProposal {
    /// Builds a proposal, deriving entity type and aspect name.
    ///
    /// # Errors
    ///
    /// Fails if `entity_urn` is not a well-formed urn.
    pub fn new(entity_urn: impl Into<String>, aspect: Aspect) -> Result<Self> {
        let entity_urn = entity_urn.into();
        let entity_type = urnkit::entity_type_of_urn(&entity_urn)?.to_string();
        Ok(Self {
            entity_type,
            entity_urn,
            aspect_name: aspect.name().to_string(),
            aspect,
        })
    }
}

/// A record emitted for the downstream catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeRecord {
    Snapshot(Snapshot),
    Proposal(ChangeProposal),
}

impl ChangeRecord {
    /// Urn of the entity the record is about.
    pub fn urn(&self) -> &str {
        match self {
            ChangeRecord::Snapshot(s) => &s.urn,
            ChangeRecord::Proposal(p) => &p.entity_urn,
        }
    }
}

/// A change record tagged with a de-duplication id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkUnit {
    pub id: String,
    pub record: ChangeRecord,
}

impl From<ChangeRecord> for WorkUnit {
    fn from(record: ChangeRecord) -> Self {
        let id = match &record {
            ChangeRecord::Snapshot(s) => s.urn.clone(),
            ChangeRecord::Proposal(p) => {
                format!("{}-{}-{}", p.entity_type, p.aspect_name, p.entity_urn)
            }
        };
        Self { id, record }
    }
}
