//! Isolated test environment with temp directory.

// Allow dead code since this is a test utility shared by several suites
#![allow(dead_code)]

use super::{NoteboxCommand, TestNote};
use notebox::domain::Note;
use notebox::infra::{JsonStorage, NoteStorage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary data directory.
///
/// The config file path points inside the temp directory, so tests never
/// read the user's configuration.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    data_dir: PathBuf,
    config_path: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let data_dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data directory");
        let config_path = temp_dir.path().join("config.toml");
        Self {
            _temp_dir: temp_dir,
            data_dir,
            config_path,
        }
    }

    /// Returns the path to the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the path of the notes file.
    pub fn notes_file(&self) -> PathBuf {
        self.data_dir.join("notes.json")
    }

    /// Returns the path of the backups directory.
    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    /// Writes the config file used by commands from this environment.
    pub fn write_config(&self, contents: &str) {
        std::fs::write(&self.config_path, contents).expect("Failed to write config");
    }

    /// Persists `notes` as the current note set.
    pub fn seed(&self, notes: &[TestNote]) {
        let notes: Vec<Note> = notes.iter().map(TestNote::to_note).collect();
        JsonStorage::new(self.notes_file())
            .save(&notes)
            .expect("Failed to seed notes");
    }

    /// Loads the persisted note set.
    pub fn load(&self) -> Vec<Note> {
        JsonStorage::new(self.notes_file())
            .load()
            .expect("Failed to load notes")
    }

    /// Creates a NoteboxCommand configured for this test environment.
    pub fn cmd(&self) -> NoteboxCommand {
        NoteboxCommand::new()
            .config(&self.config_path)
            .dir(&self.data_dir)
    }

    /// Writes a file into the temp directory (outside the data directory).
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self._temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
