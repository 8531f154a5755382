//! Backup command handlers.

use anyhow::{Context, Result, bail};

use super::Service;
use crate::backup::BackupMetadata;
use crate::cli::output::{Output, OutputFormat};
use crate::cli::{BackupArgs, BackupCommand};

pub fn handle_backup(args: &BackupArgs, service: &mut Service) -> Result<()> {
    match &args.command {
        BackupCommand::Create { format } => create(service, *format),
        BackupCommand::List { format } => list(service, *format),
        BackupCommand::Restore { id } => restore(service, id),
        BackupCommand::Verify { id } => verify(service, id),
        BackupCommand::Clean { keep } => clean(service, *keep as usize),
    }
}

fn create(service: &mut Service, format: OutputFormat) -> Result<()> {
    let backup = service
        .create_backup()
        .with_context(|| "failed to create backup")?;

    match format {
        OutputFormat::Human => {
            println!("Created backup {}", backup.id);
            println!("  date:     {}", backup.timestamp.format("%Y-%m-%d %H:%M:%S"));
            println!("  notes:    {}", backup.notes_count);
            println!("  checksum: {}…", backup.checksum.short());
        }
        OutputFormat::Json => Output::new(&backup).print()?,
    }
    Ok(())
}

fn list(service: &Service, format: OutputFormat) -> Result<()> {
    let backups: Vec<&BackupMetadata> = service.list_backups()?;

    match format {
        OutputFormat::Human => {
            if backups.is_empty() {
                println!("No backups found.");
                return Ok(());
            }
            println!("{:<33}  {:<19}  {:>5}  {:<16}", "ID", "Date", "Notes", "Checksum");
            for b in &backups {
                println!(
                    "{:<33}  {:<19}  {:>5}  {:<16}",
                    b.id,
                    b.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    b.notes_count,
                    b.checksum.short()
                );
            }
            println!();
            println!("{} backup(s)", backups.len());
        }
        OutputFormat::Json => Output::new(&backups).print()?,
    }
    Ok(())
}

fn restore(service: &mut Service, id: &str) -> Result<()> {
    service
        .restore_backup(id)
        .with_context(|| format!("failed to restore backup {}", id))?;
    println!("Restored backup {} ({} note(s))", id, service.notes_count());
    Ok(())
}

fn verify(service: &Service, id: &str) -> Result<()> {
    let known = service
        .backups()
        .is_some_and(|b| b.get_backup(id).is_some());
    if !known {
        bail!("backup not found: {}", id);
    }

    if service.verify_backup(id)? {
        println!("Backup {} is valid", id);
        Ok(())
    } else {
        bail!("backup {} is corrupted or missing its file", id)
    }
}

fn clean(service: &mut Service, keep: usize) -> Result<()> {
    let removed = service
        .clean_old_backups(keep)
        .with_context(|| "failed to prune backups")?;
    println!("Removed {} backup(s), keeping at most {}", removed, keep);
    Ok(())
}
