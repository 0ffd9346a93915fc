//! Tab-separated mustSupport usage report

use crate::models::MustSupportElement;
use crate::{MsFindError, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the report inside the reports directory
pub const REPORT_FILE_NAME: &str = "must_support_elements.tsv";

/// Report column headers
pub const REPORT_HEADER: [&str; 5] = [
    "Resource Type",
    "Profile Name",
    "Element",
    "Cardinality",
    "Use Count",
];

/// Render the report into any writer, one row per element in the given order
pub fn render_report<W: Write>(elements: &[MustSupportElement], writer: W) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    tsv.write_record(REPORT_HEADER)?;
    for element in elements {
        let use_count = element.use_count.to_string();
        tsv.write_record([
            element.structure_definition_type.as_str(),
            element.profile_name.as_str(),
            element.element_path.as_str(),
            element.cardinality.as_str(),
            use_count.as_str(),
        ])?;
    }
    tsv.flush()
        .map_err(|e| MsFindError::report_error(format!("Failed to flush report: {e}")))
}

/// Write `must_support_elements.tsv` into `out_dir`, returning its path
///
/// The file is written even when `elements` is empty.
pub fn write_report(elements: &[MustSupportElement], out_dir: &Path) -> Result<PathBuf> {
    if elements.is_empty() {
        warn!("No mustSupport elements to report");
    }

    let path = out_dir.join(REPORT_FILE_NAME);
    let file = File::create(&path).map_err(|e| MsFindError::io_error(&path, e))?;
    render_report(elements, file)?;

    info!("Saved {} elements to {}", elements.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn element(path: &str, use_count: usize) -> MustSupportElement {
        MustSupportElement {
            structure_definition_type: "Patient".to_string(),
            profile_name: "AU Core Patient".to_string(),
            profile_url: "http://example.org/StructureDefinition/au-core-patient".to_string(),
            element_path: path.to_string(),
            short_description: String::new(),
            cardinality: "0..*".to_string(),
            extension_uri: None,
            use_count,
        }
    }

    #[test]
    fn test_render_report() {
        let mut buffer = Vec::new();
        render_report(
            &[element("Patient.identifier", 3), element("Patient.extension:indigenousStatus", 0)],
            &mut buffer,
        )
        .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Resource Type\tProfile Name\tElement\tCardinality\tUse Count",
                "Patient\tAU Core Patient\tPatient.identifier\t0..*\t3",
                "Patient\tAU Core Patient\tPatient.extension:indigenousStatus\t0..*\t0",
            ]
        );
    }

    #[test]
    fn test_fields_with_tabs_are_quoted() {
        let mut item = element("Patient.name", 1);
        item.profile_name = "Tabbed\tName".to_string();

        let mut buffer = Vec::new();
        render_report(&[item], &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"Tabbed\tName\""));
    }

    #[test]
    fn test_write_empty_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_report(&[], temp_dir.path()).unwrap();

        assert_eq!(path, temp_dir.path().join(REPORT_FILE_NAME));
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "Resource Type\tProfile Name\tElement\tCardinality\tUse Count\n"
        );
    }

    #[test]
    fn test_write_report_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = write_report(&[element("Patient.name", 0)], &temp_dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, MsFindError::IoError { .. }));
    }
}
