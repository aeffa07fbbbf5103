//! Error types for heaven-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that stop the CLI before or after the engine runs.
///
/// Per-package failures are not errors here; they live in the run report.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialised
    #[error("Failed to initialise logging: {0}")]
    Logging(String),

    /// One or more packages failed
    #[error("{failed} of {total} packages failed")]
    PackagesFailed { failed: usize, total: usize },
}
