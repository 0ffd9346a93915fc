//! Working directory layout of a run
//!
//! ```text
//! <root>/
//! ├── packages/   staged copies of resolved packages
//! ├── reports/    must_support_elements.tsv
//! └── logs/       ms-find-<timestamp>.log
//! ```

use crate::{MsFindError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of per-run log file names
pub const LOG_FILE_PREFIX: &str = "ms-find";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub root: PathBuf,
    pub packages_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl RunLayout {
    /// Describe the layout under `root` without touching the filesystem
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            packages_dir: root.join("packages"),
            reports_dir: root.join("reports"),
            logs_dir: root.join("logs"),
            root,
        }
    }

    /// Create the root, reports and logs directories
    ///
    /// The packages directory is left to the stager, which owns its lifecycle.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self::new(root);
        for dir in [&layout.root, &layout.reports_dir, &layout.logs_dir] {
            create_dir(dir)?;
        }
        Ok(layout)
    }

    /// Log file path for a run started at `timestamp`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir.join(format!("{LOG_FILE_PREFIX}-{timestamp}.log"))
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| MsFindError::io_error(dir, e))?;
    tracing::debug!("Ensured directory {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("data").join("ms-find");

        let layout = RunLayout::prepare(&root).unwrap();
        assert!(layout.reports_dir.is_dir());
        assert!(layout.logs_dir.is_dir());
        assert!(!layout.packages_dir.exists());
        assert_eq!(layout.packages_dir, root.join("packages"));
    }

    #[test]
    fn test_prepare_fails_when_root_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("occupied");
        fs::write(&root, "file").unwrap();

        let err = RunLayout::prepare(&root).unwrap_err();
        assert!(matches!(err, MsFindError::IoError { .. }));
    }

    #[test]
    fn test_log_file_name() {
        let layout = RunLayout::new("/work");
        assert_eq!(
            layout.log_file("20240101-093000"),
            PathBuf::from("/work/logs/ms-find-20240101-093000.log")
        );
    }
}
