use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems with user-supplied options. Always raised before any traversal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("cannot resolve {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },

    #[error("--top must be at least 1")]
    ZeroTop,

    #[error("--older-than-days {0} is out of range")]
    AgeOutOfRange(u64),

    #[error("invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryErrorKind {
    PermissionDenied,
    NotFound,
    IoError,
}

impl From<std::io::ErrorKind> for EntryErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::PermissionDenied => EntryErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => EntryErrorKind::NotFound,
            _ => EntryErrorKind::IoError,
        }
    }
}

/// A single directory entry that could not be read during traversal.
///
/// These never leave the scanner; they are logged, counted and dropped.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", path.display())]
pub struct EntryAccessError {
    pub path: PathBuf,
    pub kind: EntryErrorKind,
    pub message: String,
}

impl EntryAccessError {
    pub fn from_io(path: PathBuf, err: &std::io::Error) -> Self {
        Self {
            path,
            kind: err.kind().into(),
            message: err.to_string(),
        }
    }
}

/// Failure to persist a report. The report itself stays valid.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode CSV for {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot encode JSON for {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    /// Destination the failed export was aimed at.
    pub fn path(&self) -> &PathBuf {
        match self {
            ExportError::CreateDir { path, .. }
            | ExportError::Write { path, .. }
            | ExportError::Csv { path, .. }
            | ExportError::Json { path, .. } => path,
        }
    }
}
