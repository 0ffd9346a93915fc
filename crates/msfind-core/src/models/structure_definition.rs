//! StructureDefinition model - represents FHIR profiles and extensions

use super::element_definition::{ElementDefinition, ElementList};
use serde::{Deserialize, Serialize};

/// FHIR StructureDefinition resource
///
/// Fields are lenient so that partially populated package files still load.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    pub url: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub differential: Option<ElementList>,
    pub snapshot: Option<ElementList>,
}

impl StructureDefinition {
    /// Elements to scan: the differential when it has any, otherwise the snapshot
    pub fn source_elements(&self) -> &[ElementDefinition] {
        match self.differential.as_ref() {
            Some(diff) if !diff.element.is_empty() => &diff.element,
            _ => self
                .snapshot
                .as_ref()
                .map(|s| s.element.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Display name: `title`, then `name`, then "Unknown"
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Constrained resource type, "Unknown" when absent
    pub fn constrained_type(&self) -> &str {
        self.type_.as_deref().unwrap_or("Unknown")
    }
}
