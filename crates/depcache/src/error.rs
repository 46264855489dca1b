//! Error types for depcache operations.
//!
//! Errors are split the same way the build treats them:
//!
//! - **`Error`**: contract violations and infrastructure failures that stop an
//!   operation (connecting an unknown node, bad configuration, I/O).
//! - **`ScanError`**: item-level failures that are collected in the
//!   [`BuildReport`](crate::BuildReport) while the build moves on to the next item.
//!
//! References that cannot be resolved, or that resolve into the reserved
//! namespace, are neither: they are skipped and counted.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::ContentId;

/// Result type for depcache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for depcache operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A node was addressed that the store has never created.
    #[error("unknown node: {0}")]
    UnknownNode(ContentId),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),
}

/// Error encountered while scanning a single item.
///
/// These errors are collected during the build but don't halt it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanError {
    /// Corpus path of the item that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: ScanErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for ScanError {}

/// Categorization of scan errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanErrorKind {
    // === Input Problems ===
    /// Item content is present but malformed
    Parse,

    /// No content ID could be found for the item
    MissingId,

    // === Internal Problems ===
    /// Item content could not be read (missing, permissions, not UTF-8)
    Read,
}

impl std::fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse failed"),
            Self::MissingId => write!(f, "missing content id"),
            Self::Read => write!(f, "read failed"),
        }
    }
}

impl ScanErrorKind {
    /// Returns `true` if the item itself is at fault and the user can fix it.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Parse | Self::MissingId)
    }

    /// Returns `true` if the item could not be reached at all.
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::Read)
    }
}

impl ScanError {
    /// Create a new scan error.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create a read error from an I/O failure.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, ScanErrorKind::Read, error.to_string())
    }

    /// Create a parse error for malformed content.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(path, ScanErrorKind::Parse, message)
    }

    /// Create an error for an item without a content ID.
    #[must_use]
    pub fn missing_id(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ScanErrorKind::MissingId, "no content id for item")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_kind_categorization() {
        assert!(ScanErrorKind::Parse.is_input_error());
        assert!(ScanErrorKind::MissingId.is_input_error());
        assert!(!ScanErrorKind::Parse.is_internal_error());

        assert!(ScanErrorKind::Read.is_internal_error());
        assert!(!ScanErrorKind::Read.is_input_error());
    }

    #[test]
    fn scan_error_display_includes_path_and_kind() {
        let error = ScanError::parse("Assets/Broken.mat", "unexpected end of stream");

        let display = error.to_string();
        assert!(display.contains("Assets/Broken.mat"));
        assert!(display.contains("unexpected end of stream"));
        assert!(display.contains("parse failed"));
    }

    #[test]
    fn read_error_keeps_io_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = ScanError::read("Assets/Level.unity", &io);

        assert_eq!(error.kind, ScanErrorKind::Read);
        assert_eq!(error.message, "gone");
    }
}
