//! Note resolution for commands that take a note argument.

use anyhow::{Result, bail};

use super::{Service, join_tags};
use crate::domain::{Note, NoteId};
use crate::service::ResolveResult;

/// Prints detailed information about ambiguous notes to help distinguish them.
fn print_ambiguous_notes(identifier: &str, notes: &[&Note]) {
    eprintln!("Ambiguous: '{}' matches {} notes:", identifier, notes.len());
    for note in notes {
        eprintln!("  {} - {}", note.id().prefix(), note.title());
        if !note.tags().is_empty() {
            eprintln!("      tags: {}", join_tags(note));
        }
    }
    eprintln!();
    eprintln!("Use the ID prefix to specify which note you mean.");
}

/// Resolves `identifier` (id, id prefix or title) to a single note id.
pub fn resolve_note_id(service: &Service, identifier: &str) -> Result<NoteId> {
    match service.resolve_note(identifier) {
        ResolveResult::Unique(note) => Ok(note.id().clone()),
        ResolveResult::Ambiguous(notes) => {
            print_ambiguous_notes(identifier, &notes);
            bail!("ambiguous note identifier: {}", identifier)
        }
        ResolveResult::NotFound => bail!("note not found: {}", identifier),
    }
}
