//! Locating and loading the msfind config file

use super::MsFindConfig;
use crate::{MsFindError, Result};
use std::path::{Path, PathBuf};

/// Config file names, in priority order, relative to each searched directory
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    "config/config.json",
    "msfind.json",
    "msfind.toml",
    "msfind.yaml",
    "msfind.yml",
];

/// Finds, loads and validates [`MsFindConfig`] files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Search `start_path` and then each parent for one of [`CONFIG_FILE_NAMES`]
    ///
    /// Within a directory the names are tried in order; the first hit wins.
    /// Returns `Ok(None)` once the filesystem root has been checked.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| MsFindError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in &CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Discovered config file {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load and validate configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<MsFindConfig> {
        let config = MsFindConfig::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the explicit `custom_path`, or discover one from `start_dir`
    ///
    /// An explicit path that does not exist is an error rather than a reason
    /// to fall back to discovery. Discovery starts in the current directory
    /// when `start_dir` is `None`.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<MsFindConfig> {
        let config_path = match custom_path {
            Some(path) => {
                if !path.exists() {
                    return Err(MsFindError::config_error(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
                Self::auto_discover(search_dir)?.ok_or_else(|| {
                    MsFindError::config_error(format!(
                        "No config file found ({})",
                        CONFIG_FILE_NAMES.join(", ")
                    ))
                })?
            }
        };

        tracing::info!("Using config {}", config_path.display());
        Self::load_from_file(&config_path)
    }
}
