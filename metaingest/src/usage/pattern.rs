//! Allow/deny regex filters.

use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Declarative form of an [`AllowDenyPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    /// Regexes a value must match to be allowed.
    #[serde(default = "allow_everything")]
    pub allow: Vec<String>,
    /// Regexes that reject a value, checked before `allow`.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Whether matching ignores case.
    #[serde(default = "yes", rename = "ignoreCase", alias = "ignore_case")]
    pub ignore_case: bool,
}

fn allow_everything() -> Vec<String> {
    vec![".*".to_string()]
}

fn yes() -> bool {
    true
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self {
            allow: allow_everything(),
            deny: Vec::new(),
            ignore_case: true,
        }
    }
}

/// Compiled allow/deny filter.
///
/// Patterns are anchored at the start of the value only. A value is allowed
/// when no deny pattern matches and at least one allow pattern does.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "PatternSpec")]
pub struct AllowDenyPattern {
    spec: PatternSpec,
    allow: Vec<Regex>,
    deny: Vec<Regex>,
}

impl AllowDenyPattern {
    /// Compiles `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Pattern`] for the first regex that fails.
    pub fn new(spec: PatternSpec) -> Result<Self, IngestError> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>, IngestError> {
            patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(&format!("^(?:{p})"))
                        .case_insensitive(spec.ignore_case)
                        .build()
                        .map_err(|source| IngestError::Pattern {
                            pattern: p.clone(),
                            source,
                        })
                })
                .collect()
        };
        let allow = compile(&spec.allow)?;
        let deny = compile(&spec.deny)?;
        Ok(Self { spec, allow, deny })
    }

    /// A filter that allows every value.
    pub fn allow_all() -> Self {
        Self {
            spec: PatternSpec::default(),
            allow: vec![Regex::new("^(?:.*)").expect("static regex")],
            deny: Vec::new(),
        }
    }

    /// The declarative form this filter was compiled from.
    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    /// Whether `value` passes the filter.
    pub fn allowed(&self, value: &str) -> bool {
        if self.deny.iter().any(|re| re.is_match(value)) {
            return false;
        }
        self.allow.iter().any(|re| re.is_match(value))
    }
}

impl Default for AllowDenyPattern {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl TryFrom<PatternSpec> for AllowDenyPattern {
    type Error = IngestError;

    fn try_from(spec: PatternSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl Serialize for AllowDenyPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.spec.serialize(serializer)
    }
}

impl JsonSchema for AllowDenyPattern {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        PatternSpec::schema_name()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        PatternSpec::json_schema(generator)
    }
}
