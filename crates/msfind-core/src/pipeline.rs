//! End-to-end run: stage packages, extract mustSupport elements, count usage
//! in instances and write the report

use crate::analyzer::UsageAnalyzer;
use crate::config::{MsFindConfig, RunMode};
use crate::layout::RunLayout;
use crate::models::MustSupportElement;
use crate::package::{PackageDescriptor, PackageStager, PackageStore};
use crate::profile::ProfileParser;
use crate::report::write_report;
use crate::stats::RunSummary;
use crate::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Options for a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory of sample instance files
    pub instances_dir: PathBuf,
    /// Treatment of previously staged packages
    pub mode: RunMode,
}

impl RunOptions {
    /// Options taken from the configuration, with instances relative to `base`
    pub fn from_config(config: &MsFindConfig, base: &Path) -> Self {
        Self {
            instances_dir: config.instances_dir(base),
            mode: config.mode(),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Elements in report order, with final use counts
    pub elements: Vec<MustSupportElement>,
    pub summary: RunSummary,
}

/// Drives one run over a prepared [`RunLayout`]
pub struct RunOrchestrator<'a> {
    config: &'a MsFindConfig,
    layout: &'a RunLayout,
    options: RunOptions,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(config: &'a MsFindConfig, layout: &'a RunLayout, options: RunOptions) -> Self {
        Self {
            config,
            layout,
            options,
        }
    }

    /// Execute the run
    ///
    /// Only setup failures are returned: an unusable package cache, a staging
    /// directory that cannot be created, or a report that cannot be written.
    /// Missing packages and malformed files are logged and skipped.
    pub fn run(&self) -> Result<RunOutcome> {
        let start = Instant::now();
        info!("Starting mustSupport run (mode: {})", self.options.mode);

        let store = PackageStore::open(self.config.package_cache()?)?;
        info!("Using FHIR package cache {}", store.root().display());

        let stager = PackageStager::new(&store, &self.layout.packages_dir);
        stager.prepare(self.options.mode)?;
        let packages = stager.stage_all(&self.config.packages);
        let packages_missing = self.config.packages.len() - packages.len();
        if packages_missing > 0 {
            warn!(
                "{} of {} configured packages could not be staged",
                packages_missing,
                self.config.packages.len()
            );
        }

        let mut parser = ProfileParser::new();
        let mut elements = parser.parse_packages(&packages);
        info!("Extraction: {}", parser.stats());

        let mut analyzer = UsageAnalyzer::new();
        analyzer.analyze_directory(&self.options.instances_dir, &mut elements);
        info!("Analysis: {}", analyzer.stats());

        let report_path = write_report(&elements, &self.layout.reports_dir)?;

        info!("Run completed in {:.2?}", start.elapsed());
        Ok(RunOutcome {
            summary: RunSummary {
                packages,
                packages_missing,
                extraction: parser.stats().clone(),
                analysis: analyzer.stats().clone(),
                report_path,
            },
            elements,
        })
    }
}

/// Resolve every configured package against the cache without staging
pub fn resolve_packages(config: &MsFindConfig) -> Result<Vec<(PackageDescriptor, Option<PathBuf>)>> {
    let store = PackageStore::open(config.package_cache()?)?;
    Ok(config
        .packages
        .iter()
        .map(|package| (package.clone(), store.resolve(&package.name, &package.version)))
        .collect())
}
