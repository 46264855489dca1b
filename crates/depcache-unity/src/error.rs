//! Error types for project-level operations.
//!
//! Per-asset failures never show up here: they are [`depcache::ScanError`]s
//! collected in the build report. These errors stop a command.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for project operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for project operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The project root does not exist or is not a directory
    #[error("project root not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file could not be parsed
    #[error("invalid config file {}: {message}", path.display())]
    Config {
        /// Path of the settings file
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },

    /// A path or ID given on the command line matches no asset
    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    /// The cache rejected the operation
    #[error(transparent)]
    Cache(#[from] depcache::Error),
}
