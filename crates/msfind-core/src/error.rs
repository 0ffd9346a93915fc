//! Error types and handling for mustSupport extraction runs

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for msfind operations
#[derive(Debug, Error)]
pub enum MsFindError {
    /// Config file missing, unreadable in its format, or failing validation
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Reading, writing or copying a file or directory failed
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document that could not be parsed or has the wrong shape
    #[error("Failed to parse {file}: {message}")]
    ParseError { file: PathBuf, message: String },

    /// The FHIR package cache root does not exist
    #[error("FHIR package cache not found at: {path}")]
    PackageCacheNotFound { path: PathBuf },

    /// A configured package has no matching folder in the cache
    #[error("Package {name}#{version} not found in FHIR package cache")]
    PackageNotFound { name: String, version: String },

    /// Report serialization errors
    #[error("Report error: {message}")]
    ReportError { message: String },

    /// Invariant broken inside msfind itself
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Coarse classification used to decide whether a run can skip the failing item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Parse,
    PackageCache,
    Package,
    Report,
    Internal,
}

impl MsFindError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MsFindError::ConfigError { .. } => ErrorKind::Config,
            MsFindError::IoError { .. } => ErrorKind::Io,
            MsFindError::ParseError { .. } => ErrorKind::Parse,
            MsFindError::PackageCacheNotFound { .. } => ErrorKind::PackageCache,
            MsFindError::PackageNotFound { .. } => ErrorKind::Package,
            MsFindError::ReportError { .. } => ErrorKind::Report,
            MsFindError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the run can continue with the next item)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Io | ErrorKind::Package
        )
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// I/O failure on `path`
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a file
    pub fn parse_error(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report_error(message: impl Into<String>) -> Self {
        Self::ReportError {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Bare I/O errors carry no path
impl From<std::io::Error> for MsFindError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<csv::Error> for MsFindError {
    fn from(err: csv::Error) -> Self {
        Self::ReportError {
            message: err.to_string(),
        }
    }
}
