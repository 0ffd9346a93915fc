//! msfind CLI
//!
//! Command-line interface for the mustSupport usage report

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use msfind_core::{MsFindError, Result, RunLayout, RunMode, init_tracing};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "msfind")]
#[command(about = "msfind: mustSupport element usage across FHIR Implementation Guide examples")]
#[command(version = msfind_core::VERSION)]
#[command(
    long_about = "msfind extracts the mustSupport elements declared by FHIR Implementation Guide\n\
packages and counts how many sample instances actually populate each of them.\n\
\n\
Examples:\n  \
msfind                                   # Run with config/config.json and ./instances\n  \
msfind run --mode keep                   # Reuse previously staged packages\n  \
msfind packages                          # Show how configured packages resolve\n  \
msfind check bundle.json Patient.name    # Test one element path against a file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Root directory for staged packages, reports and logs
    #[arg(
        short,
        long,
        global = true,
        env = "MSFIND_ROOT",
        help = "Working root directory (default: ~/data/ms-find)"
    )]
    rootdir: Option<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (config/config.json, msfind.toml, ...)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage packages, analyze instances and write the usage report
    Run {
        /// Directory of instance files
        #[arg(short, long, help = "Instances directory (default: ./instances)")]
        instances: Option<PathBuf>,

        /// Treatment of previously staged packages
        #[arg(short, long, help = "Override the configured run mode")]
        mode: Option<ModeArg>,
    },

    /// Resolve configured packages against the FHIR package cache
    Packages,

    /// Check whether an element path is populated in an instance file
    Check {
        /// Instance file (a single resource or a Bundle)
        file: PathBuf,

        /// Element path, e.g. Patient.name.given or Patient.extension:birthPlace
        path: String,

        /// Canonical URL of the extension addressed by an extension slice
        #[arg(short, long)]
        extension_uri: Option<String>,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Remove staged packages and copy them again
    Clean,
    /// Reuse staged packages
    Keep,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Clean => RunMode::Clean,
            ModeArg::Keep => RunMode::Keep,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let console_filter = match cli.verbose {
        0 => std::env::var("RUST_LOG").unwrap_or_else(|_| "msfind=warn".to_string()),
        1 => "msfind=info".to_string(),
        2 => "msfind=debug".to_string(),
        _ => "msfind=trace".to_string(),
    };

    if let Err(e) = run_cli(cli, &console_filter) {
        error!("msfind failed: {}", e);
        std::process::exit(1);
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn run_cli(cli: Cli, console_filter: &str) -> Result<()> {
    match cli.command {
        Some(Commands::Run { instances, mode }) => {
            let layout = prepare_run(cli.rootdir, console_filter)?;
            commands::run_command(
                cli.config.as_deref(),
                &layout,
                instances,
                mode.map(RunMode::from),
            )
        }
        None => {
            let layout = prepare_run(cli.rootdir, console_filter)?;
            commands::run_command(cli.config.as_deref(), &layout, None, None)
        }
        Some(Commands::Packages) => {
            init_tracing(console_filter, None);
            commands::packages_command(cli.config.as_deref())
        }
        Some(Commands::Check {
            file,
            path,
            extension_uri,
        }) => {
            init_tracing(console_filter, None);
            commands::check_command(&file, &path, extension_uri.as_deref())
        }
        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("msfind {}", msfind_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                if let Ok(profile) = std::env::var("PROFILE") {
                    println!("  Profile: {profile}");
                }
            } else {
                println!("{}", msfind_core::VERSION);
            }
            Ok(())
        }
    }
}

/// Create the run directories and start logging to a per-run log file
fn prepare_run(rootdir: Option<PathBuf>, console_filter: &str) -> Result<RunLayout> {
    match open_run(rootdir) {
        Ok((layout, log_path, log_file)) => {
            init_tracing(console_filter, Some(log_file));
            tracing::info!("Logging to {}", log_path.display());
            Ok(layout)
        }
        Err(e) => {
            init_tracing(console_filter, None);
            Err(e)
        }
    }
}

fn open_run(rootdir: Option<PathBuf>) -> Result<(RunLayout, PathBuf, File)> {
    let root = match rootdir {
        Some(root) => root,
        None => default_root()?,
    };
    let layout = RunLayout::prepare(root)?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_path = layout.log_file(&timestamp);
    let log_file = File::create(&log_path).map_err(|e| MsFindError::io_error(&log_path, e))?;
    Ok((layout, log_path, log_file))
}

fn default_root() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join("data").join("ms-find"))
        .ok_or_else(|| {
            MsFindError::config_error("No home directory available; pass --rootdir")
        })
}
