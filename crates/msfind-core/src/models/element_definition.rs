//! ElementDefinition model - the subset of element constraints the parser reads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// List of element definitions (`differential` or `snapshot`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ElementList {
    #[serde(default)]
    pub element: Vec<ElementDefinition>,
}

/// FHIR ElementDefinition - represents a constraint on a FHIR element
///
/// Only the fields needed for mustSupport extraction are modelled; everything
/// else in the JSON is ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    #[serde(default)]
    pub path: String,
    pub slice_name: Option<String>,

    // Cardinality
    pub min: Option<u32>,
    pub max: Option<String>, // Can be "*"

    // Type constraints
    #[serde(rename = "type")]
    pub type_: Option<Vec<TypeRef>>,

    pub must_support: Option<bool>,
    pub short: Option<String>,
}

/// Type reference in ElementDefinition
///
/// `profile` is kept as raw JSON: R4 packages carry a list of canonicals,
/// STU3 packages a single string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TypeRef {
    #[serde(default)]
    pub code: String,
    pub profile: Option<Value>,
}

impl TypeRef {
    /// First declared profile canonical, from either a list or a single string
    pub fn first_profile(&self) -> Option<&str> {
        match self.profile.as_ref()? {
            Value::String(url) => Some(url.as_str()),
            Value::Array(urls) => urls.iter().find_map(Value::as_str),
            _ => None,
        }
    }
}

impl ElementDefinition {
    /// Whether the element is flagged `mustSupport: true`
    pub fn is_must_support(&self) -> bool {
        self.must_support.unwrap_or(false)
    }

    /// Cardinality formatted as `min..max` (defaults `0` and `1`)
    pub fn cardinality(&self) -> String {
        format!(
            "{}..{}",
            self.min.unwrap_or(0),
            self.max.as_deref().unwrap_or("1")
        )
    }

    /// First profile URL declared on an `Extension` typed entry
    pub fn extension_profile(&self) -> Option<&str> {
        self.type_
            .as_deref()?
            .iter()
            .filter(|t| t.code == "Extension")
            .find_map(TypeRef::first_profile)
    }
}
