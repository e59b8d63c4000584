//! Path-to-id lookup table.
//!
//! Relation lists (`inherits`, `contains`, ...) name other terms. The table
//! maps every dot-joined name path in one glossary to the id declared at
//! that path, so a referenced term's explicit id can be found. It is built
//! once per glossary and only read afterwards.

use std::collections::HashMap;

use crate::glossary::config::{BusinessGlossaryConfig, GlossaryNodeConfig};

/// Dot-joined name path to declared id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathIdTable {
    ids: HashMap<String, Option<String>>,
}

impl PathIdTable {
    /// Records every node and term path of `glossary`.
    pub fn populate(glossary: &BusinessGlossaryConfig) -> Self {
        let mut table = Self::default();

        for node in glossary.nodes.iter().flatten() {
            table.add_node(node, &[]);
        }
        for term in glossary.terms.iter().flatten() {
            table.insert(&[term.name.as_str()], term.id.clone());
        }

        table
    }

    fn add_node(&mut self, node: &GlossaryNodeConfig, parent: &[&str]) {
        let path = [parent, &[node.name.as_str()]].concat();
        self.insert(&path, node.id.clone());

        for term in node.terms.iter().flatten() {
            let term_path = [path.as_slice(), &[term.name.as_str()]].concat();
            self.insert(&term_path, term.id.clone());
        }
        for child in node.nodes.iter().flatten() {
            self.add_node(child, &path);
        }
    }

    fn insert(&mut self, path: &[&str], id: Option<String>) {
        self.ids.insert(path.join("."), id);
    }

    /// The id declared at `path`, if the path exists and declared one.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.ids.get(path).and_then(|id| id.as_deref())
    }

    /// Whether `path` names a node or term.
    pub fn contains(&self, path: &str) -> bool {
        self.ids.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
