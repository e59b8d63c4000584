//! Business glossary ingestion.
//!
//! A glossary file is loaded through [`confres`], validated into a
//! [`BusinessGlossaryConfig`] and flattened into change records, one
//! snapshot per node and term plus proposals for domains and knowledge
//! links.
//!
//! - [`config`] - Glossary file types
//! - [`path_table`] - Path-to-id lookup used to resolve term relations
//! - [`flatten`] - Id derivation, owner inheritance and record emission
//! - [`source`] - The file-driven source and its report

pub mod config;
pub mod flatten;
pub mod path_table;
pub mod source;

pub use config::{
    BusinessGlossaryConfig, BusinessGlossarySourceConfig, GlossaryNodeConfig, GlossaryTermConfig,
    KnowledgeCard, Owners,
};
pub use flatten::{
    FlattenOptions, create_id, flatten, flatten_with_table, get_owners,
    make_glossary_node_urn, make_glossary_term_urn, make_institutional_memory_mcp,
};
pub use path_table::PathIdTable;
pub use source::{BusinessGlossarySource, SourceReport, load_glossary_config};
