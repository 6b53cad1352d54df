/// Error types for indexing and analysis.
///
/// Only precondition failures are returned to callers of `analyze`.
/// Entry, directory and volume failures are logged and absorbed; callers
/// detect them by inspecting `analyzed` and the emptiness of results.
use crate::model::DirKey;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("directory has no name and cannot be analyzed")]
    InvalidDirectory,

    #[error("no directory registered under key {0}")]
    UnknownDirectory(DirKey),

    #[error("failed to read entry {path}: {message}")]
    EntryRead { path: PathBuf, message: String },

    #[error("failed to enumerate directory {path}: {message}")]
    Enumeration { path: PathBuf, message: String },

    #[error("failed to enumerate volumes: {0}")]
    VolumeEnumeration(String),
}

impl ScanError {
    /// Build an `EntryRead` from anything displayable (io or jwalk errors).
    pub fn entry_read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::EntryRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Build an `Enumeration` from anything displayable.
    pub fn enumeration(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Enumeration {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
