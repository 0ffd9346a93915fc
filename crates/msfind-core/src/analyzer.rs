//! Usage analysis of mustSupport elements over sample instance files
//!
//! Each `*.json` file in the instances directory is either a Bundle (every
//! `entry[].resource` is analyzed) or a single resource. An element's
//! `use_count` goes up by one for each resource of its type in which its path
//! is populated.

use crate::matcher::ElementPath;
use crate::models::{MustSupportElement, instance_resources, resource_type};
use crate::profile::SkippedFile;
use crate::stats::AnalysisStats;
use crate::{MsFindError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Counts mustSupport element usage across instance files
#[derive(Debug, Default)]
pub struct UsageAnalyzer {
    stats: AnalysisStats,
    skipped: Vec<SkippedFile>,
}

impl UsageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze every `*.json` file directly inside `dir`
    ///
    /// All use counts are reset to zero first, so analyzing the same inputs
    /// twice gives the same counts. A missing directory leaves every count at
    /// zero.
    pub fn analyze_directory(
        &mut self,
        dir: &Path,
        elements: &mut [MustSupportElement],
    ) -> &AnalysisStats {
        self.stats = AnalysisStats::default();
        self.skipped.clear();
        for element in elements.iter_mut() {
            element.use_count = 0;
        }

        if !dir.is_dir() {
            warn!("Instances directory not found: {}", dir.display());
            return &self.stats;
        }

        let files = match instance_files(dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Error analyzing instances: {}", e);
                return &self.stats;
            }
        };
        info!("Found {} JSON files in instances directory", files.len());

        for path in files {
            info!("Analyzing instance file: {}", path.display());
            match load_instance(&path) {
                Ok(document) => {
                    let resources = instance_resources(&document);
                    info!(
                        "Found {} resources in {}",
                        resources.len(),
                        path.file_name().unwrap_or_default().to_string_lossy()
                    );
                    self.stats.files_analyzed += 1;
                    self.stats.resources_inspected += resources.len();
                    self.stats.populated_hits += count_usage(&resources, elements);
                }
                Err(e) => {
                    error!("Error processing {}: {}", path.display(), e);
                    self.stats.files_skipped += 1;
                    self.skipped.push(SkippedFile {
                        file_path: path,
                        error_message: e.to_string(),
                    });
                }
            }
        }

        self.stats.elements_used = elements.iter().filter(|e| e.use_count > 0).count();
        info!(
            "Found {} mustSupport elements with usage across all instances",
            self.stats.elements_used
        );
        &self.stats
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    pub fn skipped_files(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

/// `*.json` files directly inside `dir`, sorted by path
pub fn instance_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| MsFindError::io_error(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Failed to read entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Read and parse one instance file
pub fn load_instance(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| MsFindError::io_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| MsFindError::parse_error(path, e.to_string()))
}

/// Add one to `use_count` of each element populated in each resource of its type
///
/// Returns the number of increments made.
pub fn count_usage(resources: &[&Value], elements: &mut [MustSupportElement]) -> usize {
    let mut hits = 0;
    for element in elements.iter_mut() {
        let populated = {
            let path = ElementPath::parse(&element.element_path);
            let extension_uri = element.extension_uri.as_deref();
            resources
                .iter()
                .filter(|resource| {
                    resource_type(resource) == Some(element.structure_definition_type.as_str())
                })
                .filter(|resource| path.is_populated(resource, extension_uri))
                .count()
        };
        if populated > 0 {
            debug!(
                "Found populated element {} in {} {} resources",
                element.element_path, populated, element.structure_definition_type
            );
        }
        element.use_count += populated;
        hits += populated;
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn element(sd_type: &str, path: &str, extension_uri: Option<&str>) -> MustSupportElement {
        MustSupportElement {
            structure_definition_type: sd_type.to_string(),
            profile_name: "Test".to_string(),
            profile_url: String::new(),
            element_path: path.to_string(),
            short_description: String::new(),
            cardinality: "0..*".to_string(),
            extension_uri: extension_uri.map(str::to_string),
            use_count: 0,
        }
    }

    #[test]
    fn test_count_usage_once_per_resource() {
        let p1 = json!({"resourceType": "Patient", "name": [{"given": ["A"]}, {"given": ["B"]}]});
        let p2 = json!({"resourceType": "Patient", "name": [{"family": "C"}]});
        let obs = json!({"resourceType": "Observation", "name": [{"given": ["D"]}]});
        let mut elements = vec![
            element("Patient", "Patient.name.given", None),
            element("Patient", "Patient.name", None),
            element("Observation", "Observation.status", None),
        ];

        let hits = count_usage(&[&p1, &p2, &obs], &mut elements);
        assert_eq!(elements[0].use_count, 1);
        assert_eq!(elements[1].use_count, 2);
        assert_eq!(elements[2].use_count, 0);
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_analyze_directory_with_bundle_and_single_resource() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("bundle.json"),
            json!({
                "resourceType": "Bundle",
                "type": "collection",
                "entry": [
                    {"resource": {"resourceType": "Patient", "gender": "male",
                        "extension": [{"url": "http://example.org/birthPlace", "valueAddress": {"city": "Perth"}}]}},
                    {"resource": {"resourceType": "Patient", "gender": ""}}
                ]
            })
            .to_string(),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("patient.json"),
            json!({"resourceType": "Patient", "gender": "female"}).to_string(),
        )
        .unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut elements = vec![
            element("Patient", "Patient.gender", None),
            element(
                "Patient",
                "Patient.extension:birthPlace",
                Some("http://example.org/birthPlace"),
            ),
        ];
        let mut analyzer = UsageAnalyzer::new();
        let stats = analyzer.analyze_directory(temp_dir.path(), &mut elements).clone();

        assert_eq!(elements[0].use_count, 2);
        assert_eq!(elements[1].use_count, 1);
        assert_eq!(stats.files_analyzed, 2);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.resources_inspected, 3);
        assert_eq!(stats.populated_hits, 3);
        assert_eq!(stats.elements_used, 2);
        assert_eq!(analyzer.skipped_files().len(), 1);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("patient.json"),
            json!({"resourceType": "Patient", "active": true}).to_string(),
        )
        .unwrap();

        let mut elements = vec![element("Patient", "Patient.active", None)];
        let mut analyzer = UsageAnalyzer::new();
        analyzer.analyze_directory(temp_dir.path(), &mut elements);
        let first = elements[0].use_count;
        analyzer.analyze_directory(temp_dir.path(), &mut elements);

        assert_eq!(first, 1);
        assert_eq!(elements[0].use_count, first);
    }

    #[test]
    fn test_missing_directory_resets_counts() {
        let temp_dir = TempDir::new().unwrap();
        let mut elements = vec![element("Patient", "Patient.active", None)];
        elements[0].use_count = 7;

        let mut analyzer = UsageAnalyzer::new();
        let stats = analyzer.analyze_directory(&temp_dir.path().join("missing"), &mut elements);

        assert!(!stats.has_instances());
        assert_eq!(elements[0].use_count, 0);
    }

    #[test]
    fn test_instance_files_are_sorted_and_non_recursive() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("a.json"), "{}").unwrap();
        fs::create_dir_all(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("c.json"), "{}").unwrap();

        let files = instance_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_not_an_instance_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("patient.json"), "{}").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.json"),
            temp_dir.path().join("dangling.json"),
        )
        .unwrap();

        let files = instance_files(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("patient.json")]);
    }
}
