//! JSON persistence of the full note set.

use crate::domain::Note;
use crate::infra::fs::{FsError, write_atomic};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while loading, saving, exporting or importing notes.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid notes file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Persistence layer consumed by the note service.
///
/// Implementations must round-trip every note field exactly.
pub trait NoteStorage {
    /// Loads the persisted notes; a missing file yields an empty list.
    fn load(&self) -> Result<Vec<Note>, StorageError>;

    /// Replaces the persisted note set.
    fn save(&self, notes: &[Note]) -> Result<(), StorageError>;

    /// Writes notes to an arbitrary file in the storage format.
    fn export(&self, path: &Path, notes: &[Note]) -> Result<(), StorageError>;

    /// Reads notes from an arbitrary file in the storage format.
    fn import(&self, path: &Path) -> Result<Vec<Note>, StorageError>;
}

/// `{"notes": [...]}` envelope used on disk.
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    notes: &'a [Note],
}

#[derive(Deserialize)]
struct Envelope {
    notes: Vec<Note>,
}

/// Stores notes as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(path: &Path, notes: &[Note]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&EnvelopeRef { notes }).map_err(|e| {
            StorageError::Format {
                path: path.into(),
                source: e,
            }
        })?;
        write_atomic(path, json.as_bytes())?;
        Ok(())
    }

    fn read_file(path: &Path) -> Result<Vec<Note>, StorageError> {
        let data = std::fs::read_to_string(path).map_err(|e| StorageError::Io {
            path: path.into(),
            source: e,
        })?;
        let envelope: Envelope =
            serde_json::from_str(&data).map_err(|e| StorageError::Format {
                path: path.into(),
                source: e,
            })?;
        Ok(envelope.notes)
    }
}

impl NoteStorage for JsonStorage {
    fn load(&self) -> Result<Vec<Note>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_file(&self.path)
    }

    fn save(&self, notes: &[Note]) -> Result<(), StorageError> {
        Self::write_file(&self.path, notes)
    }

    fn export(&self, path: &Path, notes: &[Note]) -> Result<(), StorageError> {
        Self::write_file(path, notes)
    }

    fn import(&self, path: &Path) -> Result<Vec<Note>, StorageError> {
        Self::read_file(path)
    }
}

/// Parses the number of notes in a serialized note set.
///
/// Accepts the storage envelope or a bare array; returns `None` for
/// anything else.
pub fn count_notes(bytes: &[u8]) -> Option<usize> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    match value {
        serde_json::Value::Array(items) => Some(items.len()),
        serde_json::Value::Object(map) => map.get("notes")?.as_array().map(Vec::len),
        _ => None,
    }
}
