//! Statistics tracking for extraction and analysis runs

use std::fmt;
use std::path::PathBuf;

/// Statistics for the mustSupport extraction phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Number of package roots scanned
    pub packages_scanned: usize,
    /// Files whose name matched the StructureDefinition filter
    pub candidate_files: usize,
    /// Files that were StructureDefinitions
    pub structure_definitions: usize,
    /// Candidate files holding some other resource type
    pub non_structure_definitions: usize,
    /// Candidate files skipped because they could not be read or parsed
    pub files_skipped: usize,
    /// mustSupport elements extracted
    pub elements_extracted: usize,
}

impl fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mustSupport elements from {} StructureDefinitions in {} packages",
            self.elements_extracted, self.structure_definitions, self.packages_scanned
        )?;
        if self.files_skipped > 0 {
            write!(f, ", {} files skipped", self.files_skipped)?;
        }
        Ok(())
    }
}

/// Statistics for the instance analysis phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Instance files fully analyzed
    pub files_analyzed: usize,
    /// Instance files skipped (unreadable or malformed)
    pub files_skipped: usize,
    /// Resources found across all analyzed files
    pub resources_inspected: usize,
    /// Element/resource pairs where the element was populated
    pub populated_hits: usize,
    /// Elements with a non-zero use count after the pass
    pub elements_used: usize,
}

impl AnalysisStats {
    /// Check if any instance data was seen
    pub fn has_instances(&self) -> bool {
        self.resources_inspected > 0
    }
}

impl fmt::Display for AnalysisStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resources in {} files, {} mustSupport elements used",
            self.resources_inspected, self.files_analyzed, self.elements_used
        )?;
        if self.files_skipped > 0 {
            write!(f, ", {} files skipped", self.files_skipped)?;
        }
        Ok(())
    }
}

/// Summary of an entire run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Packages staged and scanned
    pub packages: Vec<PathBuf>,
    /// Packages configured but not staged
    pub packages_missing: usize,
    pub extraction: ExtractionStats,
    pub analysis: AnalysisStats,
    /// Path of the written report
    pub report_path: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Packages: {} staged", self.packages.len())?;
        if self.packages_missing > 0 {
            writeln!(f, "  {} not found", self.packages_missing)?;
        }
        writeln!(f, "Extraction: {}", self.extraction)?;
        writeln!(f, "Analysis: {}", self.analysis)?;
        write!(f, "Report: {}", self.report_path.display())
    }
}
