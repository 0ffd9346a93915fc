//! Console output for run summaries and command results

use colored::*;
use msfind_core::models::resource_type;
use msfind_core::{PackageDescriptor, RunOutcome};
use serde_json::Value;
use std::path::PathBuf;

/// Number of most used elements listed after a run
const TOP_ELEMENTS: usize = 10;

pub fn print_run_summary(outcome: &RunOutcome) {
    let summary = &outcome.summary;

    println!("\n{}", "Summary:".bold());
    println!(
        "  Packages:   {} staged",
        summary.packages.len().to_string().green()
    );
    if summary.packages_missing > 0 {
        println!(
            "              {} not found",
            summary.packages_missing.to_string().yellow()
        );
    }
    println!("  Extraction: {}", summary.extraction);
    println!("  Analysis:   {}", summary.analysis);

    if !summary.analysis.has_instances() {
        println!("  {} No instance resources analyzed", "!".yellow());
    }

    let mut used: Vec<_> = outcome.elements.iter().filter(|e| e.use_count > 0).collect();
    used.sort_by(|a, b| b.use_count.cmp(&a.use_count));
    if !used.is_empty() {
        println!("\n{}", "Most used mustSupport elements:".bold());
        for element in used.iter().take(TOP_ELEMENTS) {
            println!(
                "  {:>6}  {} ({})",
                element.use_count.to_string().cyan(),
                element.element_path,
                element.profile_name.dimmed()
            );
        }
    }

    println!(
        "\n{} Report written to {}",
        "✓".green(),
        summary.report_path.display()
    );
}

pub fn print_package_resolution(resolved: &[(PackageDescriptor, Option<PathBuf>)]) {
    if resolved.is_empty() {
        println!("No packages configured");
        return;
    }

    for (package, path) in resolved {
        match path {
            Some(path) => println!(
                "{} {} ({}) -> {}",
                "✓".green(),
                package.folder_name(),
                package.label(),
                path.display()
            ),
            None => println!(
                "{} {} ({}) -> {}",
                "✗".red(),
                package.folder_name(),
                package.label(),
                "not found".red()
            ),
        }
    }
}

pub fn print_check_results(path: &str, results: &[(&Value, bool)]) {
    for (index, (resource, populated)) in results.iter().enumerate() {
        let label = format!(
            "{}/{}",
            resource_type(resource).unwrap_or("Unknown"),
            resource.get("id").and_then(Value::as_str).unwrap_or("-")
        );
        let status = if *populated {
            "populated".green()
        } else {
            "not populated".red()
        };
        println!("[{index}] {label}: {path} {status}");
    }

    let hits = results.iter().filter(|(_, populated)| *populated).count();
    println!("\n{} of {} resources populate {}", hits, results.len(), path.bold());
}
