//! notebox - local notes with indexed search and verified backups

pub mod backup;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod search;
pub mod service;
pub mod store;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_add_tag, handle_attach, handle_attachments, handle_backup, handle_create,
        handle_delete, handle_detach, handle_export, handle_import, handle_list, handle_search,
        handle_show, handle_tag_filter, handle_tags, handle_untag, handle_update, open_service,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Completions(args) = &cli.command {
        clap_complete::generate(args.shell, &mut Cli::command(), "notebox", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load()?;
    let data_dir = config.data_dir(cli.dir.as_ref());
    let mut service = open_service(&data_dir, &config)?;

    match &cli.command {
        Command::Create(args) => handle_create(args, &mut service),
        Command::List(args) => handle_list(args, &service),
        Command::Show(args) => handle_show(args, &service),
        Command::Search(args) => handle_search(args, &mut service),
        Command::Tag(args) => handle_tag_filter(args, &mut service),
        Command::Tags(args) => handle_tags(args, &service),
        Command::AddTag(args) => handle_add_tag(args, &mut service),
        Command::Untag(args) => handle_untag(args, &mut service),
        Command::Update(args) => handle_update(args, &mut service),
        Command::Delete(args) => handle_delete(args, &mut service),
        Command::Export(args) => handle_export(args, &service),
        Command::Import(args) => handle_import(args, &mut service),
        Command::Backup(args) => handle_backup(args, &mut service),
        Command::Attach(args) => handle_attach(args, &mut service),
        Command::Detach(args) => handle_detach(args, &mut service),
        Command::Attachments(args) => handle_attachments(args, &service),
        Command::Completions(_) => Ok(()),
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("notebox={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
