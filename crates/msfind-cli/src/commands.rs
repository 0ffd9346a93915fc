//! CLI command implementations

use msfind_core::analyzer::load_instance;
use msfind_core::matcher::ElementPath;
use msfind_core::{
    ConfigLoader, Result, RunLayout, RunMode, RunOptions, RunOrchestrator, instance_resources,
    resolve_packages,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::output;

/// Run the full pipeline and print a summary
pub fn run_command(
    config_path: Option<&Path>,
    layout: &RunLayout,
    instances: Option<PathBuf>,
    mode: Option<RunMode>,
) -> Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    info!("Configuration loaded: {} packages", config.packages.len());

    let mut options = RunOptions::from_config(&config, Path::new("."));
    if let Some(instances) = instances {
        options.instances_dir = instances;
    }
    if let Some(mode) = mode {
        options.mode = mode;
    }

    let outcome = RunOrchestrator::new(&config, layout, options).run()?;
    output::print_run_summary(&outcome);
    Ok(())
}

/// Print how each configured package resolves against the cache
pub fn packages_command(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    let resolved = resolve_packages(&config)?;
    output::print_package_resolution(&resolved);
    Ok(())
}

/// Print, for each resource in `file`, whether `path` is populated
pub fn check_command(file: &Path, path: &str, extension_uri: Option<&str>) -> Result<()> {
    let document = load_instance(file)?;
    let resources = instance_resources(&document);
    if resources.is_empty() {
        warn!("No resources found in {}", file.display());
    }

    let element_path = ElementPath::parse(path);
    let results: Vec<_> = resources
        .iter()
        .map(|resource| (*resource, element_path.is_populated(resource, extension_uri)))
        .collect();
    output::print_check_results(path, &results);
    Ok(())
}
