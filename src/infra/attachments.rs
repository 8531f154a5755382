//! Attachment files and their metadata sidecar.

use crate::domain::{
    Attachment, AttachmentKind, NoteId, extension_of, is_supported, mime_type_for,
};
use crate::infra::fs::{FsError, copy_file, ensure_dir, remove_if_exists, write_atomic};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use ulid::Ulid;

const METADATA_FILE: &str = "attachments-metadata.json";
const ATTACHMENTS_DIR: &str = "attachments";

/// Errors from attachment operations.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("file to attach does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("unsupported file type '{extension}' for {path}")]
    UnsupportedType { path: PathBuf, extension: String },

    #[error("invalid attachment metadata {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Copies files into `<base>/attachments/` and tracks them in
/// `<base>/attachments-metadata.json`.
#[derive(Debug)]
pub struct AttachmentStore {
    dir: PathBuf,
    metadata_file: PathBuf,
    attachments: Vec<Attachment>,
}

impl AttachmentStore {
    /// Opens the store rooted at `base_dir`, creating the directory and
    /// loading existing metadata.
    pub fn open(base_dir: &Path) -> Result<Self, AttachmentError> {
        let dir = base_dir.join(ATTACHMENTS_DIR);
        ensure_dir(&dir)?;
        let metadata_file = base_dir.join(METADATA_FILE);

        let attachments = if metadata_file.exists() {
            let data = std::fs::read(&metadata_file)
                .map_err(|e| FsError::from_io(&metadata_file, e))?;
            serde_json::from_slice(&data).map_err(|e| AttachmentError::Metadata {
                path: metadata_file.clone(),
                source: e,
            })?
        } else {
            Vec::new()
        };

        Ok(Self {
            dir,
            metadata_file,
            attachments,
        })
    }

    /// Directory holding the copied files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `source` into the store and links it to `note_id`.
    ///
    /// # Errors
    ///
    /// `SourceNotFound` if `source` is missing, `UnsupportedType` if its
    /// extension is not accepted.
    pub fn attach_file(
        &mut self,
        note_id: &NoteId,
        source: &Path,
    ) -> Result<Attachment, AttachmentError> {
        if !source.is_file() {
            return Err(AttachmentError::SourceNotFound {
                path: source.into(),
            });
        }
        if !is_supported(source) {
            return Err(AttachmentError::UnsupportedType {
                path: source.into(),
                extension: extension_of(source),
            });
        }

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stored_path = self
            .dir
            .join(format!("{}{}", Ulid::new().to_string().to_lowercase(), extension_of(source)));
        let size = copy_file(source, &stored_path)?;
        let mime_type = mime_type_for(source).to_string();

        let attachment = Attachment {
            id: format!("attach-{}", Ulid::new()),
            note_id: note_id.clone(),
            kind: AttachmentKind::classify(&file_name, &mime_type),
            file_name,
            original_path: source.into(),
            stored_path,
            size,
            mime_type,
            created_at: Utc::now(),
        };

        self.attachments.push(attachment.clone());
        if let Err(err) = self.save_metadata() {
            self.attachments.pop();
            discard(&attachment.stored_path);
            return Err(err);
        }
        debug!(id = %attachment.id, note = %note_id, "attached file");
        Ok(attachment)
    }

    /// Removes an attachment owned by `note_id`.
    ///
    /// Returns false if the id is unknown or belongs to another note.
    pub fn detach_file(
        &mut self,
        note_id: &NoteId,
        attachment_id: &str,
    ) -> Result<bool, AttachmentError> {
        let Some(pos) = self
            .attachments
            .iter()
            .position(|a| a.id == attachment_id && &a.note_id == note_id)
        else {
            return Ok(false);
        };

        let attachment = self.attachments.remove(pos);
        if let Err(err) = self.save_metadata() {
            self.attachments.insert(pos, attachment);
            return Err(err);
        }
        discard(&attachment.stored_path);
        Ok(true)
    }

    /// Attachments of one note, in attach order.
    pub fn list_attachments(&self, note_id: &NoteId) -> Vec<&Attachment> {
        self.attachments
            .iter()
            .filter(|a| &a.note_id == note_id)
            .collect()
    }

    pub fn get_attachment(&self, attachment_id: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == attachment_id)
    }

    /// Detaches every attachment of `note_id`, returning how many were removed.
    pub fn delete_note_attachments(&mut self, note_id: &NoteId) -> Result<usize, AttachmentError> {
        let ids: Vec<String> = self
            .list_attachments(note_id)
            .into_iter()
            .map(|a| a.id.clone())
            .collect();

        let mut removed = 0;
        for id in ids {
            if self.detach_file(note_id, &id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Deletes every stored file and the metadata sidecar.
    pub fn clear_all(&mut self) -> Result<(), AttachmentError> {
        for attachment in self.attachments.drain(..) {
            discard(&attachment.stored_path);
        }
        remove_if_exists(&self.metadata_file)?;
        Ok(())
    }

    fn save_metadata(&self) -> Result<(), AttachmentError> {
        let json = serde_json::to_vec_pretty(&self.attachments).map_err(|e| {
            AttachmentError::Metadata {
                path: self.metadata_file.clone(),
                source: e,
            }
        })?;
        write_atomic(&self.metadata_file, &json)?;
        Ok(())
    }
}

fn discard(path: &Path) {
    if let Err(e) = remove_if_exists(path) {
        warn!(path = %path.display(), error = %e, "could not delete attachment file");
    }
}
