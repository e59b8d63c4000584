//! Business glossary configuration types.
//!
//! A glossary file holds defaults for every term plus a tree of nodes and
//! terms:
//!
//! ```yaml
//! version: 1
//! source: DataHub
//! owners:
//!   users: [mjames]
//! url: "https://github.com/datahub-project/datahub/"
//! nodes:
//!   - name: Classification
//!     description: A set of terms related to Data Classification
//!     terms:
//!       - name: Sensitive
//!         description: Sensitive Data
//!         custom_properties:
//!           is_confidential: false
//! ```

use std::{collections::BTreeMap, fmt};

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{IngestError, Result};

/// The only supported glossary format version.
pub const GLOSSARY_VERSION: &str = "1";

/// Users and groups owning a node or term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Owners {
    pub users: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
}

/// A link to external documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeCard {
    pub url: Option<String>,
    pub label: Option<String>,
}

/// A leaf definition in the glossary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GlossaryTermConfig {
    /// Explicit id or urn; derived from the path when absent.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    /// Overrides the glossary-level `source_type`.
    pub term_source: Option<String>,
    /// Overrides the glossary-level `source`.
    pub source_ref: Option<String>,
    /// Overrides the glossary-level `url`.
    pub source_url: Option<String>,
    pub owners: Option<Owners>,
    /// Names of terms this term is a kind of.
    pub inherits: Option<Vec<String>>,
    /// Names of terms this term contains.
    pub contains: Option<Vec<String>>,
    /// Names of terms that are allowed values of this term.
    pub values: Option<Vec<String>>,
    pub related_terms: Option<Vec<String>>,
    /// Free-form properties; scalar values are kept as text.
    #[serde(default, deserialize_with = "scalar_string_map")]
    #[schemars(with = "Option<BTreeMap<String, String>>")]
    pub custom_properties: Option<BTreeMap<String, String>>,
    pub knowledge_links: Option<Vec<KnowledgeCard>>,
    /// Domain name or urn.
    pub domain: Option<String>,
}

/// A grouping of terms and nested nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GlossaryNodeConfig {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub owners: Option<Owners>,
    pub terms: Option<Vec<GlossaryTermConfig>>,
    pub nodes: Option<Vec<GlossaryNodeConfig>>,
    pub knowledge_links: Option<Vec<KnowledgeCard>>,
}

/// A complete glossary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BusinessGlossaryConfig {
    /// Format version; must be `1`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(with = "String")]
    pub version: String,
    /// Default `source_ref` of every term.
    pub source: String,
    /// Default owners of every top-level node and term.
    pub owners: Owners,
    /// Default `source_url` of every term.
    #[serde(default)]
    pub url: Option<String>,
    /// Default `term_source` of every term.
    #[serde(default = "default_source_type")]
    pub source_type: String,
    pub nodes: Option<Vec<GlossaryNodeConfig>>,
    pub terms: Option<Vec<GlossaryTermConfig>>,
}

fn default_source_type() -> String {
    "INTERNAL".to_string()
}

/// Accepts any YAML scalar and keeps its textual form.
///
/// Floats keep their fractional part, so `1.0` stays `"1.0"`.
struct ScalarVisitor;

impl de::Visitor<'_> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
        Ok(format!("{v:?}"))
    }
}

struct ScalarString(String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor).map(ScalarString)
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    deserializer.deserialize_any(ScalarVisitor)
}

fn scalar_string_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<BTreeMap<String, String>>, D::Error> {
    let map = Option::<BTreeMap<String, ScalarString>>::deserialize(deserializer)?;
    Ok(map.map(|m| m.into_iter().map(|(k, v)| (k, v.0)).collect()))
}

impl BusinessGlossaryConfig {
    /// Parses a loaded document and checks the format version.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Schema`] for shape errors, including missing
    /// glossary-level `owners`, and [`IngestError::UnsupportedVersion`] for
    /// any version other than `1`.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let glossary: Self = serde_json::from_value(value).map_err(|source| IngestError::Schema {
            what: "business glossary",
            source,
        })?;
        glossary.validate()?;
        Ok(glossary)
    }

    /// Checks the format version.
    pub fn validate(&self) -> Result<()> {
        if self.version != GLOSSARY_VERSION {
            return Err(IngestError::UnsupportedVersion(self.version.clone()));
        }
        Ok(())
    }
}

/// Settings of the glossary source itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BusinessGlossarySourceConfig {
    /// Path or URL of the glossary file to ingest.
    pub file: String,
    /// Generate ids from a hash of each entity's path instead of the path text.
    #[serde(default)]
    pub enable_auto_id: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn minimal() -> serde_json::Value {
        json!({
            "version": 1,
            "source": "DataHub",
            "owners": {"users": ["mjames"]},
            "terms": [{"name": "Revenue", "description": "Money in"}]
        })
    }

    #[test]
    fn test_minimal_glossary() {
        let glossary = BusinessGlossaryConfig::from_value(minimal()).unwrap();
        assert_eq!(glossary.version, "1");
        assert_eq!(glossary.source_type, "INTERNAL");
        assert_eq!(glossary.url, None);
        assert_eq!(glossary.terms.as_ref().unwrap()[0].name, "Revenue");
        assert!(glossary.nodes.is_none());
    }

    #[test]
    fn test_string_version() {
        let mut value = minimal();
        value["version"] = json!("1");
        assert!(BusinessGlossaryConfig::from_value(value).is_ok());
    }

    #[test]
    fn test_wrong_version() {
        let mut value = minimal();
        value["version"] = json!("2");
        assert!(matches!(
            BusinessGlossaryConfig::from_value(value),
            Err(IngestError::UnsupportedVersion(v)) if v == "2"
        ));
    }

    #[test]
    fn test_float_version_rejected() {
        let mut value = minimal();
        value["version"] = json!(1.0);
        assert!(matches!(
            BusinessGlossaryConfig::from_value(value),
            Err(IngestError::UnsupportedVersion(v)) if v == "1.0"
        ));
    }

    #[test]
    fn test_scalar_custom_properties() {
        let mut value = minimal();
        value["terms"][0]["custom_properties"] = json!({
            "is_confidential": false,
            "priority": 1,
            "weight": 0.5,
            "owner_team": "finance"
        });
        let glossary = BusinessGlossaryConfig::from_value(value).unwrap();
        let props = glossary.terms.unwrap()[0].custom_properties.clone().unwrap();
        assert_eq!(props["is_confidential"], "false");
        assert_eq!(props["priority"], "1");
        assert_eq!(props["weight"], "0.5");
        assert_eq!(props["owner_team"], "finance");
    }

    #[test]
    fn test_nested_custom_property_rejected() {
        let mut value = minimal();
        value["terms"][0]["custom_properties"] = json!({"tags": ["a", "b"]});
        assert!(matches!(
            BusinessGlossaryConfig::from_value(value),
            Err(IngestError::Schema { .. })
        ));
    }

    #[test]
    fn test_owners_required() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("owners");
        assert!(matches!(
            BusinessGlossaryConfig::from_value(value),
            Err(IngestError::Schema { .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut value = minimal();
        value["terms"][0]["synonyms"] = json!(["Income"]);
        assert!(BusinessGlossaryConfig::from_value(value).is_err());
    }

    #[test]
    fn test_source_config_defaults() {
        let config: BusinessGlossarySourceConfig =
            serde_json::from_value(json!({"file": "glossary.yml"})).unwrap();
        assert!(!config.enable_auto_id);
    }
}
