//! Configuration types for msfind
//!
//! Keys use the kebab-case layout of `config/config.json`:
//!
//! ```json
//! {
//!   "init": [{ "mode": "clean" }],
//!   "fhir-package-cache": "~/.fhir/packages",
//!   "packages": [
//!     { "name": "hl7.fhir.au.core", "version": "current", "title": "AU Core" }
//!   ]
//! }
//! ```

use crate::package::PackageDescriptor;
use crate::{MsFindError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How previously staged packages are treated at the start of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Remove the staging directory and copy every package again
    #[default]
    Clean,
    /// Reuse packages staged by an earlier run
    Keep,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clean" => Ok(RunMode::Clean),
            "keep" => Ok(RunMode::Keep),
            other => Err(format!("Unknown mode '{other}' (expected 'clean' or 'keep')")),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Clean => write!(f, "clean"),
            RunMode::Keep => write!(f, "keep"),
        }
    }
}

/// One entry of the `init` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InitSettings {
    #[serde(default)]
    pub mode: RunMode,
}

/// Top-level msfind configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MsFindConfig {
    /// Run settings; only the first entry is used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init: Vec<InitSettings>,

    /// Root of the local FHIR package cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fhir_package_cache: Option<PathBuf>,

    /// Packages to extract mustSupport elements from
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,

    /// Directory of sample instance files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances_dir: Option<PathBuf>,
}

impl MsFindConfig {
    /// Load configuration from file
    ///
    /// The format is chosen by extension: `.json`, `.toml`, `.yaml` or `.yml`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MsFindError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());
        Self::parse(&content, ext).map_err(|message| {
            MsFindError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                message
            ))
        })
    }

    /// Parse configuration text in the format named by `ext`
    pub fn parse(content: &str, ext: Option<&str>) -> std::result::Result<Self, String> {
        match ext {
            Some("json") => serde_json::from_str(content).map_err(|e| e.to_string()),
            Some("toml") => toml::from_str(content).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            _ => Err("Unsupported file extension (expected .json, .toml, .yaml, or .yml)".into()),
        }
    }

    /// Configured run mode, `clean` by default
    pub fn mode(&self) -> RunMode {
        self.init.first().map(|i| i.mode).unwrap_or_default()
    }

    /// Package cache root: the configured path or `~/.fhir/packages`
    pub fn package_cache(&self) -> Result<PathBuf> {
        match &self.fhir_package_cache {
            Some(path) => Ok(expand_home(path)),
            None => dirs::home_dir()
                .map(|home| home.join(".fhir").join("packages"))
                .ok_or_else(|| {
                    MsFindError::config_error(
                        "fhir-package-cache is not configured and no home directory is available",
                    )
                }),
        }
    }

    /// Instances directory: the configured path or `<base>/instances`
    pub fn instances_dir(&self, base: &Path) -> PathBuf {
        self.instances_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| base.join("instances"))
    }

    /// Reject package entries without a name or version
    pub fn validate(&self) -> Result<()> {
        for (index, package) in self.packages.iter().enumerate() {
            if package.name.trim().is_empty() {
                return Err(MsFindError::config_error(format!(
                    "packages[{index}] has an empty name"
                )));
            }
            if package.version.trim().is_empty() {
                return Err(MsFindError::config_error(format!(
                    "packages[{index}] ({}) has an empty version",
                    package.name
                )));
            }
        }
        Ok(())
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
