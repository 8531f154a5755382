//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::Tag;
use output::OutputFormat;

/// notebox - local notes with indexed search and verified backups
#[derive(Parser, Debug)]
#[command(name = "notebox", version, about, long_about = None)]
pub struct Cli {
    /// Data directory (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new note
    Create(CreateArgs),

    /// List all notes
    #[command(name = "ls")]
    List(ListArgs),

    /// Show a note's contents
    Show(ShowArgs),

    /// Search notes by keyword, title or content
    Search(SearchArgs),

    /// List notes carrying the given tags
    Tag(TagFilterArgs),

    /// List all tags
    Tags(TagsArgs),

    /// Add a tag to a note
    AddTag(AddTagArgs),

    /// Remove a tag from a note
    Untag(UntagArgs),

    /// Change a note's title, content or tags
    Update(UpdateArgs),

    /// Delete a note and its attachments
    Delete(DeleteArgs),

    /// Export all notes to a JSON file
    Export(ExportArgs),

    /// Import notes from a JSON file
    Import(ImportArgs),

    /// Create, list, verify, restore or prune backups
    Backup(BackupArgs),

    /// Attach a file to a note
    Attach(AttachArgs),

    /// Remove an attachment from a note
    Detach(DetachArgs),

    /// List a note's attachments
    Attachments(AttachmentsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `create` command
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Note title
    pub title: String,

    /// Note body
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Tag for the note (can be specified multiple times)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<Tag>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `ls` (list) command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show tags and a content preview for each note
    #[arg(short, long)]
    pub long: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `search` command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Match the query against titles only
    #[arg(long, conflicts_with = "content")]
    pub title: bool,

    /// Match the query against content only
    #[arg(long)]
    pub content: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `tag` command (filter notes by tag)
#[derive(Parser, Debug)]
pub struct TagFilterArgs {
    /// Tags to look for
    #[arg(required = true)]
    pub tags: Vec<String>,

    /// Require every tag instead of any of them
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `tags` command
#[derive(Parser, Debug)]
pub struct TagsArgs {
    /// Show note counts for each tag
    #[arg(long)]
    pub counts: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `add-tag` command
#[derive(Parser, Debug)]
pub struct AddTagArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// Tag to add
    pub tag: Tag,
}

/// Arguments for the `untag` command
#[derive(Parser, Debug)]
pub struct UntagArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// Tag to remove
    pub tag: Tag,
}

/// Arguments for the `update` command
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New content
    #[arg(short, long)]
    pub content: Option<String>,

    /// Replacement tag set (can be specified multiple times)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<Tag>,

    /// Remove every tag from the note
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `delete` command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Note ID, ID prefix or title
    pub note: String,
}

/// Arguments for the `export` command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Destination file
    pub path: PathBuf,
}

/// Arguments for the `import` command
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Source file
    pub path: PathBuf,

    /// Add imported notes (with new IDs) instead of replacing every note
    #[arg(long)]
    pub merge: bool,
}

/// Arguments for the `backup` command
#[derive(Parser, Debug)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommand,
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Snapshot the notes file
    Create {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// List backups, most recent first
    List {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// Replace the notes file with a verified backup
    Restore {
        /// Backup ID
        id: String,
    },

    /// Check a backup's checksum
    Verify {
        /// Backup ID
        id: String,
    },

    /// Delete the oldest backups
    Clean {
        /// Number of backups to keep
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        keep: u32,
    },
}

/// Arguments for the `attach` command
#[derive(Parser, Debug)]
pub struct AttachArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// File to attach
    pub file: PathBuf,
}

/// Arguments for the `detach` command
#[derive(Parser, Debug)]
pub struct DetachArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// Attachment ID
    pub attachment: String,
}

/// Arguments for the `attachments` command
#[derive(Parser, Debug)]
pub struct AttachmentsArgs {
    /// Note ID, ID prefix or title
    pub note: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_tags() {
        let cli = Cli::try_parse_from(["notebox", "create", "Title", "-t", "a", "-t", "B"]).unwrap();
        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        let tags: Vec<&str> = args.tags.iter().map(Tag::as_str).collect();
        assert_eq!(tags, vec!["a", "B"]);
        assert_eq!(args.content, "");
    }

    #[test]
    fn rejects_blank_tag() {
        assert!(Cli::try_parse_from(["notebox", "add-tag", "note", "  "]).is_err());
    }

    #[test]
    fn clean_requires_positive_keep() {
        assert!(Cli::try_parse_from(["notebox", "backup", "clean", "--keep", "0"]).is_err());
        let cli = Cli::try_parse_from(["notebox", "backup", "clean"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Backup(BackupArgs {
                command: BackupCommand::Clean { keep: 5 }
            })
        ));
    }

    #[test]
    fn search_modes_conflict() {
        assert!(
            Cli::try_parse_from(["notebox", "search", "q", "--title", "--content"]).is_err()
        );
    }
}
