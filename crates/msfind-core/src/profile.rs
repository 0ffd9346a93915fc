//! mustSupport extraction from StructureDefinitions in FHIR packages
//!
//! Package folders are scanned for `*StructureDefinition*.json` files. Each file
//! whose `resourceType` is `StructureDefinition` contributes one
//! [`MustSupportElement`] per element flagged `mustSupport`.

use crate::matcher::{ElementPath, PathSegment};
use crate::models::{ElementDefinition, MustSupportElement, StructureDefinition, resource_type};
use crate::stats::ExtractionStats;
use crate::{MsFindError, Result};
use glob::Pattern;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// File name filter for candidate StructureDefinition files
pub const STRUCTURE_DEFINITION_FILE_PATTERN: &str = "*StructureDefinition*.json";

/// A file skipped during extraction
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file_path: PathBuf,
    pub error_message: String,
}

/// Extracts mustSupport elements from package folders
///
/// Unreadable or malformed files are skipped and recorded; they never abort
/// the pass.
pub struct ProfileParser {
    pattern: Option<Pattern>,
    stats: ExtractionStats,
    skipped: Vec<SkippedFile>,
}

impl ProfileParser {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::new(STRUCTURE_DEFINITION_FILE_PATTERN).ok(),
            stats: ExtractionStats::default(),
            skipped: Vec::new(),
        }
    }

    /// Extract elements from every package root, in the given order
    pub fn parse_packages(&mut self, package_roots: &[PathBuf]) -> Vec<MustSupportElement> {
        let mut elements = Vec::new();
        for root in package_roots {
            self.parse_package(root, &mut elements);
        }
        elements
    }

    /// Extract elements from one package root, appending to `out`
    pub fn parse_package(&mut self, root: &Path, out: &mut Vec<MustSupportElement>) {
        info!("Processing package: {}", root.display());
        self.stats.packages_scanned += 1;

        let candidates = self.candidate_files(root);
        info!(
            "Found {} StructureDefinition files in {}",
            candidates.len(),
            root.display()
        );
        self.stats.candidate_files += candidates.len();

        for path in candidates {
            match load_structure_definition(&path) {
                Ok(Some(sd)) => {
                    self.stats.structure_definitions += 1;
                    let extracted = extract_must_support(&sd);
                    if !extracted.is_empty() {
                        info!(
                            "Found {} mustSupport elements in {}",
                            extracted.len(),
                            sd.name.as_deref().unwrap_or("Unknown")
                        );
                    }
                    self.stats.elements_extracted += extracted.len();
                    out.extend(extracted);
                }
                Ok(None) => {
                    warn!("Skipping non-StructureDefinition file {}", path.display());
                    self.stats.non_structure_definitions += 1;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    self.stats.files_skipped += 1;
                    self.skipped.push(SkippedFile {
                        file_path: path,
                        error_message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Candidate files below `root`, each once, in sorted order
    fn candidate_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Failed to read entry under {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| self.pattern.as_ref().is_some_and(|p| p.matches(name)))
            })
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files.dedup();
        files
    }

    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    pub fn skipped_files(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

impl Default for ProfileParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a file and return it as a StructureDefinition, or `None` if it is another resource
pub fn load_structure_definition(path: &Path) -> Result<Option<StructureDefinition>> {
    let content = fs::read_to_string(path).map_err(|e| MsFindError::io_error(path, e))?;
    let json: Value = serde_json::from_str(&content)
        .map_err(|e| MsFindError::parse_error(path, e.to_string()))?;

    if resource_type(&json) != Some("StructureDefinition") {
        return Ok(None);
    }

    serde_json::from_value(json)
        .map(Some)
        .map_err(|e| MsFindError::parse_error(path, e.to_string()))
}

/// All mustSupport elements of a StructureDefinition, in element order
pub fn extract_must_support(sd: &StructureDefinition) -> Vec<MustSupportElement> {
    sd.source_elements()
        .iter()
        .filter(|element| element.is_must_support())
        .map(|element| must_support_element(sd, element))
        .collect()
}

fn must_support_element(sd: &StructureDefinition, element: &ElementDefinition) -> MustSupportElement {
    let mut element_path = element.path.clone();
    let mut extension_uri = None;

    if let Some(slice_name) = element.slice_name.as_deref()
        && let Some(sliced) = slice_extension_path(&element.path, slice_name)
    {
        extension_uri = element.extension_profile().map(str::to_string);
        element_path = sliced;
    }

    MustSupportElement {
        structure_definition_type: sd.constrained_type().to_string(),
        profile_name: sd.display_name().to_string(),
        profile_url: sd.url.clone().unwrap_or_default(),
        element_path,
        short_description: element.short.clone().unwrap_or_default(),
        cardinality: element.cardinality(),
        extension_uri,
        use_count: 0,
    }
}

/// Rewrite a sliced extension path to `<parent>.extension:<sliceName>`
///
/// `parent` is everything before the first `extension` segment. Returns `None`
/// when the path has no such segment.
pub fn slice_extension_path(path: &str, slice_name: &str) -> Option<String> {
    let parsed = ElementPath::parse(path);
    let raw: Vec<&str> = path.split('.').collect();
    let index = parsed
        .segments()
        .iter()
        .position(|segment| *segment == PathSegment::Extensions)?;

    let parent = raw[..index].join(".");
    if parent.is_empty() {
        Some(format!("extension:{slice_name}"))
    } else {
        Some(format!("{parent}.extension:{slice_name}"))
    }
}
