//! Note service: the single entry point for reading and mutating notes.
//!
//! Every mutation persists the full note set, counts toward automatic
//! backups and rebuilds the search index before returning.

mod auto_backup;

pub use auto_backup::{AutoBackupConfig, InvalidAutoBackupConfig};

use crate::backup::{BackupError, BackupManager, BackupMetadata};
use crate::domain::{Attachment, Note, NoteId, Tag};
use crate::infra::{AttachmentError, AttachmentStore, NoteStorage, StorageError};
use crate::search::{IndexedSearch, SearchIndex};
use crate::store::NoteStore;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by [`NoteService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("backups are not configured")]
    BackupsDisabled,

    #[error("attachments are not configured")]
    AttachmentsDisabled,

    #[error(transparent)]
    InvalidConfig(#[from] InvalidAutoBackupConfig),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Fields to change on an existing note. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<Tag>>,
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Result of resolving a user-supplied note identifier.
#[derive(Debug)]
pub enum ResolveResult<'a> {
    /// Exactly one note matched.
    Unique(&'a Note),
    /// Multiple notes matched.
    Ambiguous(Vec<&'a Note>),
    /// No notes matched.
    NotFound,
}

/// Orchestrates the note store, persistence, search index, backups and
/// attachments.
pub struct NoteService<S: NoteStorage, E: IndexedSearch = SearchIndex> {
    storage: S,
    engine: E,
    store: NoteStore,
    backups: Option<BackupManager>,
    attachments: Option<AttachmentStore>,
    auto_backup: AutoBackupConfig,
}

impl<S: NoteStorage, E: IndexedSearch> NoteService<S, E> {
    /// Loads every persisted note and builds the search index.
    pub fn open(storage: S, mut engine: E) -> Result<Self, ServiceError> {
        let mut store = NoteStore::new();
        for note in storage.load()? {
            store.add(note);
        }
        engine.build_indexes(store.all());
        debug!(notes = store.len(), "loaded notes");

        Ok(Self {
            storage,
            engine,
            store,
            backups: None,
            attachments: None,
            auto_backup: AutoBackupConfig::default(),
        })
    }

    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = Some(backups);
        self
    }

    pub fn with_attachments(mut self, attachments: AttachmentStore) -> Self {
        self.attachments = Some(attachments);
        self
    }

    // Notes

    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<Tag>,
    ) -> Result<Note, ServiceError> {
        let note = Note::new(title, content, tags);
        let added = note.clone();
        self.commit(|store| store.add(added))?;
        Ok(note)
    }

    /// Applies `update` and returns the updated note.
    pub fn update_note(&mut self, id: &NoteId, update: NoteUpdate) -> Result<Note, ServiceError> {
        let note = self
            .store
            .get(id)
            .ok_or_else(|| ServiceError::NoteNotFound(id.clone()))?;
        if update.is_empty() {
            return Ok(note.clone());
        }

        let updated = self.commit(|store| {
            let note = store.get_mut(id)?;
            if let Some(title) = update.title {
                note.set_title(title);
            }
            if let Some(content) = update.content {
                note.set_content(content);
            }
            if let Some(tags) = update.tags {
                note.set_tags(tags);
            }
            Some(note.clone())
        })?;
        updated.ok_or_else(|| ServiceError::NoteNotFound(id.clone()))
    }

    /// Adds `tag` to a note. Returns false if the note already had it.
    pub fn add_tag(&mut self, id: &NoteId, tag: Tag) -> Result<bool, ServiceError> {
        let note = self
            .store
            .get(id)
            .ok_or_else(|| ServiceError::NoteNotFound(id.clone()))?;
        if note.has_tag(tag.as_str()) {
            return Ok(false);
        }
        self.commit(|store| store.get_mut(id).is_some_and(|n| n.add_tag(tag)))
    }

    /// Removes `tag` from a note. Returns false if the note did not have it.
    pub fn remove_tag(&mut self, id: &NoteId, tag: &Tag) -> Result<bool, ServiceError> {
        let note = self
            .store
            .get(id)
            .ok_or_else(|| ServiceError::NoteNotFound(id.clone()))?;
        if !note.has_tag(tag.as_str()) {
            return Ok(false);
        }
        self.commit(|store| store.get_mut(id).is_some_and(|n| n.remove_tag(tag)))
    }

    /// Deletes a note and its attachments. Returns false for unknown ids.
    ///
    /// Attachments are removed once the note set without the note is saved.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<bool, ServiceError> {
        if !self.store.contains(id) {
            return Ok(false);
        }
        self.commit(|store| store.remove(id))?;
        if let Some(attachments) = self.attachments.as_mut() {
            let removed = attachments.delete_note_attachments(id)?;
            debug!(note = %id, removed, "removed note attachments");
        }
        Ok(true)
    }

    pub fn get_note(&self, id: &NoteId) -> Option<&Note> {
        self.store.get(id)
    }

    /// Resolves an exact id, an id prefix or an exact title (ignoring case).
    ///
    /// A full id or a prefix matching a single note wins outright; otherwise
    /// prefix and title matches are pooled.
    pub fn resolve_note(&self, identifier: &str) -> ResolveResult<'_> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return ResolveResult::NotFound;
        }

        if let Some(note) = identifier
            .parse::<NoteId>()
            .ok()
            .and_then(|id| self.store.get(&id))
        {
            return ResolveResult::Unique(note);
        }

        let mut candidates: Vec<&Note> = Vec::new();
        let looks_like_id =
            identifier.len() >= 4 && !identifier.chars().any(char::is_whitespace);
        if looks_like_id {
            let by_prefix = self.store.find_by_id_prefix(identifier);
            if let [only] = by_prefix.as_slice() {
                return ResolveResult::Unique(*only);
            }
            candidates.extend(by_prefix);
        }

        for note in self.store.find_by_title(identifier) {
            if !candidates.iter().any(|c| c.id() == note.id()) {
                candidates.push(note);
            }
        }

        match candidates.len() {
            0 => ResolveResult::NotFound,
            1 => ResolveResult::Unique(candidates[0]),
            _ => ResolveResult::Ambiguous(candidates),
        }
    }

    pub fn all_notes(&self) -> &[Note] {
        self.store.all()
    }

    pub fn notes_count(&self) -> usize {
        self.store.len()
    }

    /// Removes every note.
    pub fn clear_all_notes(&mut self) -> Result<(), ServiceError> {
        self.commit(NoteStore::clear)
    }

    // Search

    pub fn search_notes(&mut self, query: &str) -> Vec<&Note> {
        self.engine.search(self.store.all(), query)
    }

    pub fn notes_by_tag(&mut self, tag: &str) -> Vec<&Note> {
        self.engine.search_by_tag(self.store.all(), tag)
    }

    pub fn notes_by_title(&mut self, title: &str) -> Vec<&Note> {
        self.engine.search_by_title(self.store.all(), title)
    }

    pub fn notes_by_content(&mut self, content: &str) -> Vec<&Note> {
        self.engine.search_by_content(self.store.all(), content)
    }

    pub fn notes_by_tags(&mut self, tags: &[String], match_all: bool) -> Vec<&Note> {
        self.engine
            .search_multiple_tags(self.store.all(), tags, match_all)
    }

    /// Lowercased tags with their note counts, sorted by tag.
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        self.engine.tag_counts()
    }

    // Import / export

    /// Writes every note to `path`. Returns how many were written.
    pub fn export_notes(&self, path: &Path) -> Result<usize, ServiceError> {
        self.storage.export(path, self.store.all())?;
        info!(path = %path.display(), notes = self.store.len(), "exported notes");
        Ok(self.store.len())
    }

    /// Reads notes from `path`. Returns how many were imported.
    ///
    /// Without `merge` the imported set replaces every note. With `merge`
    /// each imported note is added as a new note with a fresh id.
    pub fn import_notes(&mut self, path: &Path, merge: bool) -> Result<usize, ServiceError> {
        let imported = self.storage.import(path)?;
        let count = imported.len();

        self.commit(|store| {
            if merge {
                for note in imported {
                    store.add(Note::new(note.title(), note.content(), note.tags().to_vec()));
                }
            } else {
                store.clear();
                for note in imported {
                    store.add(note);
                }
            }
        })?;
        info!(path = %path.display(), notes = count, merge, "imported notes");
        Ok(count)
    }

    // Backups

    /// Enables automatic backups with the given thresholds.
    pub fn configure_auto_backup(
        &mut self,
        max_modifications: u32,
        max_backups: usize,
    ) -> Result<(), ServiceError> {
        let config = AutoBackupConfig::enabled(max_modifications, max_backups);
        config.validate()?;
        self.auto_backup = config;
        Ok(())
    }

    pub fn disable_auto_backup(&mut self) {
        self.auto_backup.enabled = false;
    }

    pub fn auto_backup_config(&self) -> AutoBackupConfig {
        self.auto_backup
    }

    pub fn backups(&self) -> Option<&BackupManager> {
        self.backups.as_ref()
    }

    pub fn create_backup(&mut self) -> Result<BackupMetadata, ServiceError> {
        Ok(self.backup_manager()?.create_backup()?)
    }

    pub fn list_backups(&self) -> Result<Vec<&BackupMetadata>, ServiceError> {
        let backups = self.backups.as_ref().ok_or(ServiceError::BackupsDisabled)?;
        Ok(backups.list_backups())
    }

    pub fn verify_backup(&self, id: &str) -> Result<bool, ServiceError> {
        let backups = self.backups.as_ref().ok_or(ServiceError::BackupsDisabled)?;
        Ok(backups.verify_backup_integrity(id)?)
    }

    /// Restores a snapshot, then reloads notes and rebuilds the index.
    pub fn restore_backup(&mut self, id: &str) -> Result<(), ServiceError> {
        self.backup_manager()?.restore_backup(id)?;

        let notes = self.storage.load()?;
        self.store.clear();
        for note in notes {
            self.store.add(note);
        }
        self.engine.build_indexes(self.store.all());
        info!(id, notes = self.store.len(), "reloaded notes from backup");
        Ok(())
    }

    /// Keeps only the newest `max_backups` snapshots. Returns how many were removed.
    pub fn clean_old_backups(&mut self, max_backups: usize) -> Result<usize, ServiceError> {
        Ok(self.backup_manager()?.clean_old_backups(max_backups)?)
    }

    fn backup_manager(&mut self) -> Result<&mut BackupManager, ServiceError> {
        self.backups.as_mut().ok_or(ServiceError::BackupsDisabled)
    }

    // Attachments

    /// Copies `source` into the attachment store for an existing note.
    pub fn attach_file(&mut self, id: &NoteId, source: &Path) -> Result<Attachment, ServiceError> {
        if !self.store.contains(id) {
            return Err(ServiceError::NoteNotFound(id.clone()));
        }
        let attachments = self
            .attachments
            .as_mut()
            .ok_or(ServiceError::AttachmentsDisabled)?;
        Ok(attachments.attach_file(id, source)?)
    }

    /// Returns false if the attachment is unknown or belongs to another note.
    pub fn detach_file(&mut self, id: &NoteId, attachment_id: &str) -> Result<bool, ServiceError> {
        let attachments = self
            .attachments
            .as_mut()
            .ok_or(ServiceError::AttachmentsDisabled)?;
        Ok(attachments.detach_file(id, attachment_id)?)
    }

    pub fn list_attachments(&self, id: &NoteId) -> Result<Vec<&Attachment>, ServiceError> {
        let attachments = self
            .attachments
            .as_ref()
            .ok_or(ServiceError::AttachmentsDisabled)?;
        Ok(attachments.list_attachments(id))
    }

    /// Applies `change` to the store, saves, counts toward auto-backup, then
    /// rebuilds the index.
    ///
    /// If the save fails the previous store and index are put back.
    fn commit<T>(&mut self, change: impl FnOnce(&mut NoteStore) -> T) -> Result<T, ServiceError> {
        let previous = self.store.clone();
        let out = change(&mut self.store);

        if let Err(err) = self.storage.save(self.store.all()) {
            self.store = previous;
            self.engine.build_indexes(self.store.all());
            return Err(err.into());
        }
        self.auto_backup_if_due();
        self.engine.build_indexes(self.store.all());
        Ok(out)
    }

    /// Failures are logged and never surface to the mutation that triggered them.
    fn auto_backup_if_due(&mut self) {
        let config = self.auto_backup;
        if !config.enabled {
            return;
        }
        let Some(backups) = self.backups.as_mut() else {
            return;
        };
        let count = match backups.increment_modification_count() {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "could not record modification count");
                backups.modifications_since_last_backup()
            }
        };
        if count < config.max_modifications {
            return;
        }

        let result = backups
            .create_backup()
            .and_then(|_| backups.clean_old_backups(config.max_backups));
        if let Err(err) = result {
            warn!(error = %err, "automatic backup failed");
        }
    }
}

impl<S: NoteStorage, E: IndexedSearch> fmt::Debug for NoteService<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteService")
            .field("notes", &self.store.len())
            .field("backups", &self.backups.is_some())
            .field("attachments", &self.attachments.is_some())
            .field("auto_backup", &self.auto_backup)
            .finish_non_exhaustive()
    }
}
