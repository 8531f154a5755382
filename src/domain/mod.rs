//! Core types: Note, NoteId, Tag, Attachment

mod attachment;
mod note;
mod note_id;
mod tag;

pub use attachment::{
    Attachment, AttachmentKind, SUPPORTED_EXTENSIONS, extension_of, is_supported, mime_type_for,
};
pub use note::{Note, NoteBuilder, ParseNoteError};
pub use note_id::{NoteId, ParseNoteIdError};
pub use tag::{ParseTagError, Tag};
