//! Error types for heaven-core

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result type for heaven-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hiding or resetting a package.
///
/// Every variant is fatal for the package it was raised in and never for its
/// siblings; the engine attributes it to the package and moves on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller passed something outside the contract (unknown item, bad name)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Link folder holds unmanaged content where a symlink belongs
    #[error("Link folder corrupted at {path}: {reason}")]
    ManagedFolderCorrupted { path: PathBuf, reason: String },

    /// Settings file exists but cannot be used as a settings document
    #[error("Malformed settings at {path}: {message}")]
    MalformedSettings { path: PathBuf, message: String },

    /// Include or exclude pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Filesystem error from heaven-fs
    #[error(transparent)]
    Fs(#[from] heaven_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Stable, serializable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    ManagedFolderCorrupted,
    MalformedSettings,
    InvalidPattern,
    Config,
    Io,
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn corrupted(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ManagedFolderCorrupted {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::ManagedFolderCorrupted { .. } => ErrorKind::ManagedFolderCorrupted,
            Self::MalformedSettings { .. } => ErrorKind::MalformedSettings,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Self::Fs(heaven_fs::Error::ConfigParse { .. })
            | Self::Fs(heaven_fs::Error::UnsupportedFormat { .. }) => ErrorKind::Config,
            Self::Fs(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}
