//! Command handlers for the CLI.

mod attachments;
mod backup;
mod notes;
mod resolve;
mod search;

use anyhow::{Context, Result};
use std::path::Path;

use crate::backup::BackupManager;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat};
use crate::domain::Note;
use crate::infra::{AttachmentStore, JsonStorage};
use crate::search::SearchIndex;
use crate::service::NoteService;

// Re-export public items
pub use attachments::{handle_attach, handle_attachments, handle_detach};
pub use backup::handle_backup;
pub use notes::{
    handle_add_tag, handle_create, handle_delete, handle_export, handle_import, handle_list,
    handle_show, handle_untag, handle_update,
};
pub use resolve::resolve_note_id;
pub use search::{handle_search, handle_tag_filter, handle_tags};

/// Notes file inside the data directory.
pub const NOTES_FILE: &str = "notes.json";

/// Backups directory inside the data directory.
pub const BACKUPS_DIR: &str = "backups";

/// Service type used by every command.
pub type Service = NoteService<JsonStorage, SearchIndex>;

/// Opens the note service for `data_dir` with backups and attachments enabled.
pub fn open_service(data_dir: &Path, config: &Config) -> Result<Service> {
    let notes_file = data_dir.join(NOTES_FILE);
    let storage = JsonStorage::new(&notes_file);
    let backups = BackupManager::open(&notes_file, data_dir.join(BACKUPS_DIR))
        .with_context(|| format!("failed to open backups in {}", data_dir.display()))?;
    let attachments = AttachmentStore::open(data_dir)
        .with_context(|| format!("failed to open attachments in {}", data_dir.display()))?;

    let mut service = NoteService::open(storage, SearchIndex::new())
        .with_context(|| format!("failed to load notes from {}", notes_file.display()))?
        .with_backups(backups)
        .with_attachments(attachments);

    let auto = config.auto_backup;
    if auto.enabled {
        service.configure_auto_backup(auto.max_modifications, auto.max_backups)?;
    }
    Ok(service)
}

// ===========================================
// Shared Utilities
// ===========================================

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Comma-separated tag names as written.
pub(crate) fn join_tags(note: &Note) -> String {
    note.tags()
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints a note table, or the JSON envelope of full notes.
pub(crate) fn print_notes(notes: &[&Note], format: OutputFormat, empty: &str) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if notes.is_empty() {
                println!("{empty}");
                return Ok(());
            }
            println!("{:<10}  {:<50}  {:>10}", "ID", "Title", "Updated");
            println!(
                "{:<10}  {:<50}  {:>10}",
                "----------",
                "--------------------------------------------------",
                "----------"
            );
            for note in notes {
                println!(
                    "{:<10}  {:<50}  {:>10}",
                    note.id().prefix(),
                    truncate_str(note.title(), 50),
                    note.updated_at().format("%Y-%m-%d")
                );
            }
            println!();
            println!("{} note(s)", notes.len());
        }
        OutputFormat::Json => Output::new(notes).print()?,
    }
    Ok(())
}
