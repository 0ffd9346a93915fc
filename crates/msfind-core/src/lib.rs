//! msfind core
//!
//! Finds the mustSupport elements declared by FHIR Implementation Guide
//! packages and counts how often sample instances actually populate them.
//! The pipeline stages packages from the local FHIR package cache, extracts
//! mustSupport elements from their StructureDefinitions, walks each element
//! path over every instance resource and writes a tab-separated usage report.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod layout;
pub mod matcher;
pub mod models;
pub mod package;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod result;
pub mod stats;

// Re-export commonly used types
pub use analyzer::UsageAnalyzer;
pub use config::{ConfigLoader, MsFindConfig, RunMode};
pub use error::{ErrorKind, MsFindError};
pub use layout::RunLayout;
pub use matcher::{ElementPath, PathSegment, is_populated};
pub use models::{MustSupportElement, StructureDefinition, instance_resources};
pub use package::{PackageDescriptor, PackageStager, PackageStore};
pub use pipeline::{RunOptions, RunOrchestrator, RunOutcome, resolve_packages};
pub use profile::ProfileParser;
pub use report::{REPORT_FILE_NAME, write_report};
pub use result::{Result, ResultExt};
pub use stats::{AnalysisStats, ExtractionStats, RunSummary};

/// Initialize the tracing subscriber for logging
///
/// Console output goes to stderr, filtered by `console_filter` (an
/// `EnvFilter` directive such as `msfind=info`). When `log_file` is given,
/// everything at INFO and above is also written there without colors.
pub fn init_tracing(console_filter: &str, log_file: Option<std::fs::File>) {
    use std::sync::Mutex;
    use tracing_subscriber::{
        EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let filter = EnvFilter::try_new(console_filter).unwrap_or_else(|_| EnvFilter::new("msfind=warn"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let file = log_file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_filter(LevelFilter::INFO)
    });

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
