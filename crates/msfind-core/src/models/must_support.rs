//! MustSupportElement - one mustSupport element declared by a profile

use serde::{Deserialize, Serialize};

/// A mustSupport element extracted from a StructureDefinition
///
/// `use_count` is the only mutable part: the usage analyzer increments it once
/// per instance resource in which `element_path` is populated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MustSupportElement {
    pub structure_definition_type: String,
    pub profile_name: String,
    pub profile_url: String,
    /// Declared path, with sliced extensions rewritten to `<parent>.extension:<slice>`
    pub element_path: String,
    pub short_description: String,
    pub cardinality: String,
    pub extension_uri: Option<String>,
    #[serde(default)]
    pub use_count: usize,
}
