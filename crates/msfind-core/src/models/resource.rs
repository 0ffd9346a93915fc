//! Instance resources as loaded from sample data files

use serde_json::Value;

/// `resourceType` of a JSON resource, if it has one
pub fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("resourceType").and_then(Value::as_str)
}

/// Check whether a JSON document is a FHIR Bundle
pub fn is_bundle(document: &Value) -> bool {
    resource_type(document) == Some("Bundle")
}

/// Resources carried by an instance document
///
/// A Bundle yields every `entry[].resource` object in entry order; any other
/// JSON object is itself the only resource. Non-object documents carry nothing.
pub fn instance_resources(document: &Value) -> Vec<&Value> {
    if is_bundle(document) {
        return document
            .get("entry")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("resource"))
                    .filter(|resource| resource.is_object())
                    .collect()
            })
            .unwrap_or_default();
    }

    if document.is_object() {
        vec![document]
    } else {
        Vec::new()
    }
}
