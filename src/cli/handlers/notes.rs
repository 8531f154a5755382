//! Note lifecycle handlers (create, ls, show, update, tag edits, delete,
//! export, import).

use anyhow::{Context, Result, bail};

use super::{Service, join_tags, print_notes, resolve_note_id, truncate_str};
use crate::cli::output::{Output, OutputFormat};
use crate::cli::{
    AddTagArgs, CreateArgs, DeleteArgs, ExportArgs, ImportArgs, ListArgs, ShowArgs, UntagArgs,
    UpdateArgs,
};
use crate::domain::Note;
use crate::service::NoteUpdate;

pub fn handle_create(args: &CreateArgs, service: &mut Service) -> Result<()> {
    let note = service
        .create_note(&args.title, &args.content, args.tags.clone())
        .with_context(|| format!("failed to create note: {}", args.title))?;

    match args.format {
        OutputFormat::Human => {
            println!("Created: {} [{}]", note.title(), note.id().prefix());
        }
        OutputFormat::Json => Output::new(&note).print()?,
    }
    Ok(())
}

pub fn handle_list(args: &ListArgs, service: &Service) -> Result<()> {
    let notes: Vec<&Note> = service.all_notes().iter().collect();

    if args.long && matches!(args.format, OutputFormat::Human) {
        if notes.is_empty() {
            println!("No notes found.");
        }
        for note in &notes {
            println!("{} {}", note.id().prefix(), note.title());
            if !note.tags().is_empty() {
                println!("    tags: {}", join_tags(note));
            }
            if !note.content().is_empty() {
                let first_line = note.content().lines().next().unwrap_or_default();
                println!("    {}", truncate_str(first_line, 70));
            }
        }
        return Ok(());
    }

    print_notes(&notes, args.format, "No notes found.")
}

pub fn handle_show(args: &ShowArgs, service: &Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    let Some(note) = service.get_note(&id) else {
        bail!("note not found: {}", args.note);
    };

    match args.format {
        OutputFormat::Human => {
            println!("# {}", note.title());
            println!();
            println!(
                "ID: {}  Created: {}  Updated: {}",
                note.id(),
                note.created_at().format("%Y-%m-%d %H:%M"),
                note.updated_at().format("%Y-%m-%d %H:%M")
            );
            if !note.tags().is_empty() {
                println!("Tags: {}", join_tags(note));
            }
            let attachments = service.list_attachments(&id)?;
            if !attachments.is_empty() {
                println!("Attachments: {}", attachments.len());
            }
            if !note.content().is_empty() {
                println!();
                println!("{}", note.content());
            }
        }
        OutputFormat::Json => Output::new(note).print()?,
    }
    Ok(())
}

pub fn handle_update(args: &UpdateArgs, service: &mut Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;

    let tags = if args.clear_tags {
        Some(Vec::new())
    } else if args.tags.is_empty() {
        None
    } else {
        Some(args.tags.clone())
    };
    let update = NoteUpdate {
        title: args.title.clone(),
        content: args.content.clone(),
        tags,
    };
    if update.is_empty() {
        bail!("nothing to update: pass --title, --content, --tag or --clear-tags");
    }

    let note = service
        .update_note(&id, update)
        .with_context(|| format!("failed to update note: {}", args.note))?;
    match args.format {
        OutputFormat::Human => println!("Updated: {} [{}]", note.title(), note.id().prefix()),
        OutputFormat::Json => Output::new(&note).print()?,
    }
    Ok(())
}

pub fn handle_add_tag(args: &AddTagArgs, service: &mut Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    let added = service
        .add_tag(&id, args.tag.clone())
        .with_context(|| format!("failed to tag note: {}", args.note))?;

    if added {
        println!("Tagged [{}] with '{}'", id.prefix(), args.tag);
    } else {
        println!("Note [{}] already has tag '{}'", id.prefix(), args.tag);
    }
    Ok(())
}

pub fn handle_untag(args: &UntagArgs, service: &mut Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    let removed = service
        .remove_tag(&id, &args.tag)
        .with_context(|| format!("failed to untag note: {}", args.note))?;

    if removed {
        println!("Removed tag '{}' from [{}]", args.tag, id.prefix());
    } else {
        println!("Note [{}] does not have tag '{}'", id.prefix(), args.tag);
    }
    Ok(())
}

pub fn handle_delete(args: &DeleteArgs, service: &mut Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    let title = service
        .get_note(&id)
        .map(|n| n.title().to_string())
        .unwrap_or_default();

    if !service
        .delete_note(&id)
        .with_context(|| format!("failed to delete note: {}", args.note))?
    {
        bail!("note not found: {}", args.note);
    }
    println!("Deleted: {} [{}]", title, id.prefix());
    Ok(())
}

pub fn handle_export(args: &ExportArgs, service: &Service) -> Result<()> {
    let count = service
        .export_notes(&args.path)
        .with_context(|| format!("failed to export notes to {}", args.path.display()))?;
    println!("Exported {} note(s) to {}", count, args.path.display());
    Ok(())
}

pub fn handle_import(args: &ImportArgs, service: &mut Service) -> Result<()> {
    let count = service
        .import_notes(&args.path, args.merge)
        .with_context(|| format!("failed to import notes from {}", args.path.display()))?;
    let verb = if args.merge { "Merged" } else { "Imported" };
    println!("{} {} note(s) from {}", verb, count, args.path.display());
    Ok(())
}
