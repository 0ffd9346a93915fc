//! Element path matching against JSON resource instances
//!
//! Decides whether a mustSupport element path (e.g. `Patient.name.given`,
//! `Patient.extension:birthPlace`, `Observation.component.code`) resolves to
//! a populated value in a resource.
//!
//! # Algorithm Overview
//!
//! 1. **Path Parsing**: split the path on `.` into [`PathSegment`]s
//! 2. **Prefix Stripping**: drop a leading segment equal to the resource's `resourceType`
//! 3. **Walk**: move a cursor through the JSON tree one segment at a time
//!    - repeating elements are searched for the first entry carrying the field
//!    - extension slices are found by a ranked search (canonical URL, then slice name)
//! 4. **Population Check**: the final value must not be null, blank, or an empty array
//!
//! Any structural mismatch along the way means "not populated"; it is never an error.
//! Every segment other than `extension` and `extension:<slice>` is a literal JSON
//! key, so `value[x]` or `modifierExtension:<slice>` only match a key spelled that way.
//!
//! # Example
//!
//! ```rust
//! use msfind_core::matcher::is_populated;
//! use serde_json::json;
//!
//! let patient = json!({"resourceType": "Patient", "name": [{"given": ["Jo"]}]});
//! assert!(is_populated(&patient, "Patient.name.given", None));
//! assert!(!is_populated(&patient, "Patient.birthDate", None));
//! ```

use serde_json::Value;
use tracing::trace;

/// The field that holds FHIR extensions and may be addressed by slice
const EXTENSION_FIELD: &str = "extension";

/// One segment of a dotted element path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Sliced extension: `extension:<sliceName>`
    Slice(&'a str),
    /// Bare `extension`, taken unfiltered
    Extensions,
    /// Plain field name
    Field(&'a str),
}

impl<'a> PathSegment<'a> {
    /// Parse a single segment
    pub fn parse(raw: &'a str) -> Self {
        if raw == EXTENSION_FIELD {
            return PathSegment::Extensions;
        }
        match raw.split_once(':') {
            Some((EXTENSION_FIELD, slice_name)) => PathSegment::Slice(slice_name),
            _ => PathSegment::Field(raw),
        }
    }
}

/// A parsed element path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath<'a> {
    segments: Vec<PathSegment<'a>>,
}

impl<'a> ElementPath<'a> {
    /// Split a dotted path into segments
    pub fn parse(path: &'a str) -> Self {
        Self {
            segments: path.split('.').map(PathSegment::parse).collect(),
        }
    }

    /// All segments, including any resource type prefix
    pub fn segments(&self) -> &[PathSegment<'a>] {
        &self.segments
    }

    /// Segments to walk for a resource of the given type
    fn walkable(&self, resource_type: Option<&str>) -> &[PathSegment<'a>] {
        match (self.segments.first(), resource_type) {
            (Some(PathSegment::Field(first)), Some(rt)) if *first == rt => &self.segments[1..],
            _ => &self.segments,
        }
    }

    /// Walk the path through `resource`, returning the value it lands on
    ///
    /// `None` means the walk failed somewhere (missing field, wrong container
    /// kind, no matching extension slice).
    pub fn resolve<'v>(&self, resource: &'v Value, extension_uri: Option<&str>) -> Option<&'v Value> {
        let resource_type = resource.get("resourceType").and_then(Value::as_str);
        let extension_uri = extension_uri.filter(|uri| !uri.is_empty());

        let mut cursor = resource;
        for segment in self.walkable(resource_type) {
            cursor = match step(cursor, segment, extension_uri) {
                Some(next) => next,
                None => {
                    trace!("Path walk stopped at {:?}", segment);
                    return None;
                }
            };
        }
        Some(cursor)
    }

    /// Check if the path resolves to a populated value in `resource`
    pub fn is_populated(&self, resource: &Value, extension_uri: Option<&str>) -> bool {
        self.resolve(resource, extension_uri)
            .is_some_and(is_populated_value)
    }
}

/// Check if `path` resolves to a populated value in `resource`
///
/// `extension_uri` is the canonical URL of the extension addressed by any
/// `extension:<slice>` segment; when absent, slices are matched by name only.
pub fn is_populated(resource: &Value, path: &str, extension_uri: Option<&str>) -> bool {
    ElementPath::parse(path).is_populated(resource, extension_uri)
}

/// A value counts as populated unless it is null, a blank string, or an empty array
pub fn is_populated_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn step<'v>(cursor: &'v Value, segment: &PathSegment<'_>, extension_uri: Option<&str>) -> Option<&'v Value> {
    match *segment {
        PathSegment::Slice(slice_name) => {
            let entries = cursor.as_object()?.get(EXTENSION_FIELD)?.as_array()?;
            find_extension_slice(entries, slice_name, extension_uri)
        }
        PathSegment::Extensions => cursor.as_object()?.get(EXTENSION_FIELD),
        PathSegment::Field(name) => lookup(cursor, name),
    }
}

/// Field lookup on an object, or on the first array entry that has the field
fn lookup<'v>(cursor: &'v Value, name: &str) -> Option<&'v Value> {
    match cursor {
        Value::Object(obj) => obj.get(name),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .find_map(|obj| obj.get(name)),
        _ => None,
    }
}

/// How well an extension entry matches a slice, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SliceRank {
    /// `url` equals the extension's canonical URL
    CanonicalUrl,
    /// `url` ends with the slice name, or `sliceName` equals it
    SliceName,
}

fn rank_extension(entry: &Value, slice_name: &str, extension_uri: Option<&str>) -> Option<SliceRank> {
    let entry = entry.as_object()?;
    let url = entry.get("url").and_then(Value::as_str);

    if let (Some(uri), Some(url)) = (extension_uri, url)
        && uri == url
    {
        return Some(SliceRank::CanonicalUrl);
    }

    let by_url_suffix = url.is_some_and(|url| url.ends_with(slice_name));
    let by_slice_name = entry.get("sliceName").and_then(Value::as_str) == Some(slice_name);
    (by_url_suffix || by_slice_name).then_some(SliceRank::SliceName)
}

/// Best-ranked extension entry; ties go to the earliest entry
fn find_extension_slice<'v>(
    entries: &'v [Value],
    slice_name: &str,
    extension_uri: Option<&str>,
) -> Option<&'v Value> {
    entries
        .iter()
        .filter_map(|entry| rank_extension(entry, slice_name, extension_uri).map(|rank| (rank, entry)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, entry)| entry)
}
