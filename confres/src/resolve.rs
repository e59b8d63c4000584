//! Environment-variable resolution over nested configuration values.
//!
//! Mappings and sequences are rebuilt recursively, string leaves go through
//! [`resolve_element_with`], every other scalar is copied unchanged. Keys are
//! never interpolated.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::expand::{Expander, ProbeEnv, ProcessEnv, Unbound, VarSource};

static BRACED_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{.+\}").expect("static regex"));

/// Resolves a single string against the process environment.
pub fn resolve_element(element: &str) -> String {
    resolve_element_with(element, &ProcessEnv)
}

/// Resolves a single string against `source`.
///
/// - Strings containing a `${...}` placeholder are expanded with unset
///   variables replaced by the empty string.
/// - Otherwise strings starting with `$` are expanded, and returned verbatim
///   if any referenced variable is unset.
/// - Everything else is returned as-is.
///
/// Expansion never fails: a string that cannot be expanded is kept literally.
pub fn resolve_element_with(element: &str, source: &dyn VarSource) -> String {
    if BRACED_PLACEHOLDER.is_match(element) {
        match Expander::new(source, Unbound::Empty).expand(element) {
            Ok(expanded) => expanded,
            Err(e) => {
                warn!("Keeping {element:?} unexpanded: {e}");
                element.to_string()
            }
        }
    } else if element.starts_with('$') {
        Expander::new(source, Unbound::Error)
            .expand(element)
            .unwrap_or_else(|_| element.to_string())
    } else {
        element.to_string()
    }
}

/// Resolves every string leaf of `config` against the process environment.
pub fn resolve_env_variables(config: &Value) -> Value {
    resolve_with(config, &ProcessEnv)
}

/// Resolves every string leaf of `config` against `source`.
pub fn resolve_with(config: &Value, source: &dyn VarSource) -> Value {
    match config {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_with(v, source)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve_with(v, source)).collect()),
        Value::String(s) => Value::String(resolve_element_with(s, source)),
        other => other.clone(),
    }
}

/// Lists every variable name that resolving `config` would look up.
///
/// The environment is never read; lookups are answered by a [`ProbeEnv`].
pub fn list_referenced_env_variables(config: &Value) -> BTreeSet<String> {
    let probe = ProbeEnv::new();
    let _ = resolve_with(config, &probe);
    probe.into_names()
}
