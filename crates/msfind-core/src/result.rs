//! Result alias and per-item error absorption

use crate::error::MsFindError;

/// Result type used throughout msfind
pub type Result<T> = std::result::Result<T, MsFindError>;

/// Absorb an error for one item (a package, a file) so the run can move on
pub trait ResultExt<T> {
    /// Log the error against `item` and yield `None`
    ///
    /// Recoverable errors are logged as warnings, anything else as an error.
    fn log_and_continue(self, item: &str) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_and_continue(self, item: &str) -> Option<T> {
        self.map_err(|err| {
            if err.is_recoverable() {
                tracing::warn!("Skipping {}: {}", item, err);
            } else {
                tracing::error!("Skipping {} after unexpected error: {}", item, err);
            }
        })
        .ok()
    }
}
