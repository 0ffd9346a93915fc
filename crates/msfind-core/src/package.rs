//! FHIR package resolution against the local package cache
//!
//! Packages live in the cache as `<name>#<version>` folders (the layout used by
//! `~/.fhir/packages`). [`PackageStore`] resolves a configured name/version to
//! one of those folders, and [`PackageStager`] copies resolved packages into the
//! run's own `packages/` directory.

use crate::config::RunMode;
use crate::result::ResultExt;
use crate::{MsFindError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Version tokens that name a moving build rather than a release
pub const VERSION_ALIASES: [&str; 3] = ["dev", "current", "cibuild"];

/// A package to process, as declared in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Cache folder name: `<name>#<version>`
    pub fn folder_name(&self) -> String {
        format!("{}#{}", self.name, self.version)
    }

    /// Title for log output, falling back to the package name
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Check if the version is one of [`VERSION_ALIASES`]
    pub fn is_alias_version(&self) -> bool {
        VERSION_ALIASES.contains(&self.version.as_str())
    }
}

/// The local FHIR package cache
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    /// Open the cache at `root`; a missing root is a setup error
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(MsFindError::PackageCacheNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All `<name>#*` folders in the cache, sorted by folder name
    pub fn versions_of(&self, name: &str) -> Vec<PathBuf> {
        let prefix = format!("{name}#");
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read package cache {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut folders: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        folders.sort();
        folders
    }

    /// Resolve a name/version pair to a cache folder
    ///
    /// 1. An exact `<name>#<version>` folder wins.
    /// 2. For an alias version (`dev`, `current`, `cibuild`), a `<name>#*` folder
    ///    ending in `#<version>` is used.
    /// 3. Otherwise the most recently modified `<name>#*` folder is used. This
    ///    depends on filesystem mtimes and is logged as a warning.
    pub fn resolve(&self, name: &str, version: &str) -> Option<PathBuf> {
        let package = PackageDescriptor::new(name, version);
        let exact = self.root.join(package.folder_name());
        if exact.is_dir() {
            debug!("Resolved {} to {}", package.folder_name(), exact.display());
            return Some(exact);
        }

        let candidates = self.versions_of(name);

        if package.is_alias_version() {
            let suffix = format!("#{version}");
            if let Some(found) = candidates.iter().find(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&suffix))
            }) {
                return Some(found.clone());
            }
        }

        let latest = most_recently_modified(&candidates)?;
        warn!(
            "Package {} not found, using {} instead",
            package.folder_name(),
            latest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        Some(latest.to_path_buf())
    }

    /// Resolve a descriptor, turning a miss into [`MsFindError::PackageNotFound`]
    pub fn require(&self, package: &PackageDescriptor) -> Result<PathBuf> {
        self.resolve(&package.name, &package.version).ok_or_else(|| {
            MsFindError::PackageNotFound {
                name: package.name.clone(),
                version: package.version.clone(),
            }
        })
    }
}

fn most_recently_modified(paths: &[PathBuf]) -> Option<&Path> {
    paths
        .iter()
        .max_by_key(|path| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH)
        })
        .map(PathBuf::as_path)
}

/// Copies resolved packages into the run's staging directory
pub struct PackageStager<'a> {
    store: &'a PackageStore,
    staging_dir: PathBuf,
}

impl<'a> PackageStager<'a> {
    pub fn new(store: &'a PackageStore, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Prepare the staging directory
    ///
    /// In [`RunMode::Clean`] previously staged packages are removed first; a
    /// failed removal is logged and the run continues with what is there.
    pub fn prepare(&self, mode: RunMode) -> Result<()> {
        if mode == RunMode::Clean && self.staging_dir.exists() {
            info!("Removing staged packages in {}", self.staging_dir.display());
            if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
                error!(
                    "Could not remove staged packages in {}: {}",
                    self.staging_dir.display(),
                    e
                );
            }
        }

        fs::create_dir_all(&self.staging_dir)
            .map_err(|e| MsFindError::io_error(&self.staging_dir, e))
    }

    /// Stage one package, returning its staged folder
    ///
    /// An already staged package is reused as is.
    pub fn stage(&self, package: &PackageDescriptor) -> Result<PathBuf> {
        let source = match self.store.require(package) {
            Ok(source) => source,
            Err(e) => {
                let available: Vec<String> = self
                    .store
                    .versions_of(&package.name)
                    .iter()
                    .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .collect();
                error!(
                    "Package {} not found; available versions: {:?}",
                    package.folder_name(),
                    available
                );
                return Err(e);
            }
        };

        let target = self.staging_dir.join(package.folder_name());
        if target.exists() {
            info!(
                "Skipping existing local package for {}: {} ({})",
                package.label(),
                package.name,
                package.version
            );
            return Ok(target);
        }

        if let Err(e) = copy_dir_all(&source, &target) {
            // A partial copy would be reused as is in keep mode.
            if let Err(cleanup) = fs::remove_dir_all(&target) {
                warn!(
                    "Could not remove partial copy {}: {}",
                    target.display(),
                    cleanup
                );
            }
            return Err(e);
        }
        info!(
            "Copied {}: {} ({}) from FHIR cache",
            package.label(),
            package.name,
            package.version
        );
        Ok(target)
    }

    /// Stage every package, skipping (and logging) those that fail
    pub fn stage_all(&self, packages: &[PackageDescriptor]) -> Vec<PathBuf> {
        packages
            .iter()
            .filter_map(|package| self.stage(package).log_and_continue(&package.folder_name()))
            .collect()
    }
}

fn copy_dir_all(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            MsFindError::io_error(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| MsFindError::internal_error(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .map_err(|e| MsFindError::io_error(&destination, e))?;
        } else {
            fs::copy(entry.path(), &destination)
                .map_err(|e| MsFindError::io_error(entry.path(), e))?;
        }
    }
    Ok(())
}
