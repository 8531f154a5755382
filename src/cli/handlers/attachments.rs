//! Attachment command handlers.

use anyhow::{Context, Result, bail};

use super::{Service, resolve_note_id, truncate_str};
use crate::cli::output::{Output, OutputFormat};
use crate::cli::{AttachArgs, AttachmentsArgs, DetachArgs};

pub fn handle_attach(args: &AttachArgs, service: &mut Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    let attachment = service
        .attach_file(&id, &args.file)
        .with_context(|| format!("failed to attach {}", args.file.display()))?;

    println!(
        "Attached {} ({}, {} bytes) as {}",
        attachment.file_name, attachment.kind, attachment.size, attachment.id
    );
    Ok(())
}

pub fn handle_detach(args: &DetachArgs, service: &mut Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    if !service.detach_file(&id, &args.attachment)? {
        bail!(
            "attachment {} not found on note [{}]",
            args.attachment,
            id.prefix()
        );
    }
    println!("Detached {}", args.attachment);
    Ok(())
}

pub fn handle_attachments(args: &AttachmentsArgs, service: &Service) -> Result<()> {
    let id = resolve_note_id(service, &args.note)?;
    let attachments = service.list_attachments(&id)?;

    match args.format {
        OutputFormat::Human => {
            if attachments.is_empty() {
                println!("No attachments.");
                return Ok(());
            }
            for a in &attachments {
                println!(
                    "{}  {:<8}  {:>9}  {}",
                    a.id,
                    a.kind,
                    a.size,
                    truncate_str(&a.file_name, 40)
                );
            }
        }
        OutputFormat::Json => Output::new(&attachments).print()?,
    }
    Ok(())
}
