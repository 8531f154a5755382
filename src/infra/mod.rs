//! File I/O: JSON storage, checksums, attachments

mod attachments;
mod content_hash;
mod fs;
mod storage;

pub use attachments::{AttachmentError, AttachmentStore};
pub use content_hash::{ContentHash, ContentHashError};
pub use fs::{FsError, copy_file, ensure_dir, remove_if_exists, write_atomic};
pub use storage::{JsonStorage, NoteStorage, StorageError, count_notes};
