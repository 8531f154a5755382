use crate::infra::{ContentHash, FsError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by backup operations.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("data file not found: {path}")]
    DataFileMissing { path: PathBuf },

    #[error("backup not found: {id}")]
    NotFound { id: String },

    #[error("backup file missing for {id}: {path}")]
    SnapshotMissing { id: String, path: PathBuf },

    #[error("backup {id} failed integrity check (expected {}, found {})", expected.short(), actual.short())]
    IntegrityFailure {
        id: String,
        expected: ContentHash,
        actual: ContentHash,
    },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid backup metadata {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not generate a unique backup id")]
    IdGeneration,

    #[error(transparent)]
    Fs(#[from] FsError),
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BackupError::Io {
            path: path.into(),
            source,
        }
    }
}
