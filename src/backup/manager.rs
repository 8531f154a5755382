//! Snapshot, verify, restore and prune copies of the notes file.

use super::error::BackupError;
use super::metadata::BackupMetadata;
use crate::infra::{
    ContentHash, FsError, copy_file, count_notes, ensure_dir, remove_if_exists, write_atomic,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use ulid::Generator;

/// File name of the metadata index inside the backups directory.
pub const METADATA_FILE: &str = "backups-metadata.json";

/// File name of the persisted modification counter inside the backups
/// directory.
pub const STATE_FILE: &str = "backups-state.json";

/// Counter state that must outlive a single process.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupState {
    modifications_since_backup: u32,
}

/// Manages checksummed snapshots of a single data file.
///
/// Records are kept in creation order; listing and pruning sort by
/// timestamp with ties broken by that order.
pub struct BackupManager {
    data_file: PathBuf,
    backups_dir: PathBuf,
    metadata_file: PathBuf,
    state_file: PathBuf,
    backups: Vec<BackupMetadata>,
    ids: Generator,
    modifications: u32,
    last_backup: Option<DateTime<Utc>>,
}

impl BackupManager {
    /// Opens the backup directory for `data_file`, creating it if needed and
    /// loading any existing metadata index and modification counter.
    pub fn open(
        data_file: impl Into<PathBuf>,
        backups_dir: impl Into<PathBuf>,
    ) -> Result<Self, BackupError> {
        let data_file = data_file.into();
        let backups_dir = backups_dir.into();
        ensure_dir(&backups_dir)?;

        let metadata_file = backups_dir.join(METADATA_FILE);
        let backups = load_metadata(&metadata_file)?;
        let last_backup = backups.iter().map(|b| b.timestamp).max();
        let state_file = backups_dir.join(STATE_FILE);
        let state = load_state(&state_file)?;
        debug!(
            count = backups.len(),
            modifications = state.modifications_since_backup,
            dir = %backups_dir.display(),
            "loaded backup metadata"
        );

        Ok(Self {
            data_file,
            backups_dir,
            metadata_file,
            state_file,
            backups,
            ids: Generator::new(),
            modifications: state.modifications_since_backup,
            last_backup,
        })
    }

    /// Copies the data file into a new snapshot and records its checksum.
    pub fn create_backup(&mut self) -> Result<BackupMetadata, BackupError> {
        if !self.data_file.exists() {
            return Err(BackupError::DataFileMissing {
                path: self.data_file.clone(),
            });
        }

        let ulid = self.ids.generate().map_err(|_| BackupError::IdGeneration)?;
        let id = format!("backup-{ulid}");
        let file_path = self.backups_dir.join(format!("{id}.json"));

        let bytes = fs::read(&self.data_file).map_err(|e| BackupError::io(&self.data_file, e))?;
        write_new(&file_path, &bytes)?;

        let checksum =
            ContentHash::of_file(&file_path).map_err(|e| BackupError::io(&file_path, e))?;
        let metadata = BackupMetadata {
            id,
            timestamp: Utc::now(),
            checksum,
            notes_count: count_notes(&bytes).unwrap_or(0),
            file_path,
        };

        self.backups.push(metadata.clone());
        self.save_metadata()?;
        self.last_backup = Some(metadata.timestamp);
        self.zero_counter();

        info!(
            id = %metadata.id,
            notes = metadata.notes_count,
            checksum = metadata.checksum.short(),
            "created backup"
        );
        Ok(metadata)
    }

    /// All backups, most recent first.
    pub fn list_backups(&self) -> Vec<&BackupMetadata> {
        let mut list = self.oldest_first();
        list.reverse();
        list
    }

    pub fn get_backup(&self, id: &str) -> Option<&BackupMetadata> {
        self.backups.iter().find(|b| b.id == id)
    }

    /// Recomputes the snapshot checksum and compares it to the recorded one.
    ///
    /// Unknown ids and missing snapshot files report `false`.
    pub fn verify_backup_integrity(&self, id: &str) -> Result<bool, BackupError> {
        let Some(backup) = self.get_backup(id) else {
            return Ok(false);
        };
        if !backup.file_path.exists() {
            return Ok(false);
        }
        let actual = ContentHash::of_file(&backup.file_path)
            .map_err(|e| BackupError::io(&backup.file_path, e))?;
        Ok(actual == backup.checksum)
    }

    /// Overwrites the data file with a verified snapshot.
    ///
    /// The live file is copied aside first and put back if the overwrite
    /// fails.
    pub fn restore_backup(&mut self, id: &str) -> Result<(), BackupError> {
        let backup = self
            .get_backup(id)
            .ok_or_else(|| BackupError::NotFound { id: id.to_string() })?;
        if !backup.file_path.exists() {
            return Err(BackupError::SnapshotMissing {
                id: id.to_string(),
                path: backup.file_path.clone(),
            });
        }

        let bytes =
            fs::read(&backup.file_path).map_err(|e| BackupError::io(&backup.file_path, e))?;
        let actual = ContentHash::compute(&bytes);
        if actual != backup.checksum {
            return Err(BackupError::IntegrityFailure {
                id: id.to_string(),
                expected: backup.checksum.clone(),
                actual,
            });
        }

        replace_with_rollback(&self.data_file, &bytes, write_atomic)?;
        self.zero_counter();
        info!(id, "restored backup");
        Ok(())
    }

    /// Deletes the oldest backups until at most `max_backups` remain.
    ///
    /// Returns how many were removed. A snapshot that cannot be deleted keeps
    /// its record.
    pub fn clean_old_backups(&mut self, max_backups: usize) -> Result<usize, BackupError> {
        if self.backups.len() <= max_backups {
            return Ok(0);
        }

        let excess = self.backups.len() - max_backups;
        let doomed: Vec<String> = self
            .oldest_first()
            .into_iter()
            .take(excess)
            .map(|b| b.id.clone())
            .collect();

        let removed = self.remove_records(&doomed);
        self.save_metadata()?;
        info!(removed, kept = self.backups.len(), "pruned old backups");
        Ok(removed)
    }

    /// Deletes every snapshot and record. Returns how many were removed.
    pub fn clear_all_backups(&mut self) -> Result<usize, BackupError> {
        let all: Vec<String> = self.backups.iter().map(|b| b.id.clone()).collect();
        let removed = self.remove_records(&all);
        self.save_metadata()?;
        if self.backups.is_empty() {
            self.last_backup = None;
        }
        info!(removed, "cleared backups");
        Ok(removed)
    }

    /// Bumps the modification counter, persists it and returns the new value.
    ///
    /// On a write error the in-memory counter keeps the new value.
    pub fn increment_modification_count(&mut self) -> Result<u32, BackupError> {
        self.modifications = self.modifications.saturating_add(1);
        self.save_state()?;
        Ok(self.modifications)
    }

    pub fn modifications_since_last_backup(&self) -> u32 {
        self.modifications
    }

    pub fn reset_modification_count(&mut self) -> Result<(), BackupError> {
        self.modifications = 0;
        self.save_state()
    }

    pub fn last_backup_time(&self) -> Option<DateTime<Utc>> {
        self.last_backup
    }

    pub fn time_since_last_backup(&self) -> Option<TimeDelta> {
        self.last_backup.map(|t| Utc::now() - t)
    }

    fn oldest_first(&self) -> Vec<&BackupMetadata> {
        let mut list: Vec<&BackupMetadata> = self.backups.iter().collect();
        list.sort_by_key(|b| b.timestamp);
        list
    }

    fn remove_records(&mut self, ids: &[String]) -> usize {
        let mut removed = 0;
        self.backups.retain(|b| {
            if !ids.contains(&b.id) {
                return true;
            }
            match remove_if_exists(&b.file_path) {
                Ok(_) => {
                    removed += 1;
                    false
                }
                Err(e) => {
                    warn!(id = %b.id, error = %e, "could not delete backup file");
                    true
                }
            }
        });
        removed
    }

    /// Resets the counter after a backup or restore that already succeeded.
    fn zero_counter(&mut self) {
        if let Err(e) = self.reset_modification_count() {
            warn!(error = %e, "could not persist modification counter");
        }
    }

    fn save_state(&self) -> Result<(), BackupError> {
        let state = BackupState {
            modifications_since_backup: self.modifications,
        };
        let json = serde_json::to_string_pretty(&state).map_err(|e| BackupError::Metadata {
            path: self.state_file.clone(),
            source: e,
        })?;
        write_atomic(&self.state_file, json.as_bytes())?;
        Ok(())
    }

    fn save_metadata(&self) -> Result<(), BackupError> {
        let json = serde_json::to_string_pretty(&self.backups).map_err(|e| {
            BackupError::Metadata {
                path: self.metadata_file.clone(),
                source: e,
            }
        })?;
        write_atomic(&self.metadata_file, json.as_bytes())?;
        Ok(())
    }
}

impl fmt::Debug for BackupManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupManager")
            .field("data_file", &self.data_file)
            .field("backups_dir", &self.backups_dir)
            .field("backups", &self.backups.len())
            .field("modifications", &self.modifications)
            .finish_non_exhaustive()
    }
}

fn load_metadata(path: &Path) -> Result<Vec<BackupMetadata>, BackupError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path).map_err(|e| BackupError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| BackupError::Metadata {
        path: path.into(),
        source: e,
    })
}

fn load_state(path: &Path) -> Result<BackupState, BackupError> {
    if !path.exists() {
        return Ok(BackupState::default());
    }
    let data = fs::read_to_string(path).map_err(|e| BackupError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| BackupError::Metadata {
        path: path.into(),
        source: e,
    })
}

/// Writes a snapshot, refusing to replace an existing file.
fn write_new(path: &Path, bytes: &[u8]) -> Result<(), BackupError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| BackupError::io(path, e))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| BackupError::io(path, e))
}

/// Replaces `data_file` with `bytes` through `write`, keeping a side copy of
/// the live file and putting it back if the write fails.
fn replace_with_rollback(
    data_file: &Path,
    bytes: &[u8],
    write: impl FnOnce(&Path, &[u8]) -> Result<(), FsError>,
) -> Result<(), BackupError> {
    let side_file = side_path(data_file);
    let had_live = data_file.exists();
    if had_live {
        copy_file(data_file, &side_file)?;
    }

    if let Err(err) = write(data_file, bytes) {
        if had_live {
            match copy_file(&side_file, data_file) {
                Ok(_) => discard(&side_file),
                Err(rollback) => warn!(
                    error = %rollback,
                    side_file = %side_file.display(),
                    "could not roll back data file"
                ),
            }
        }
        return Err(err.into());
    }

    if had_live {
        discard(&side_file);
    }
    Ok(())
}

/// `<data>.tmp` beside the data file.
fn side_path(data_file: &Path) -> PathBuf {
    let mut name = data_file.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn discard(path: &Path) {
    if let Err(e) = remove_if_exists(path) {
        warn!(path = %path.display(), error = %e, "could not remove temporary file");
    }
}
