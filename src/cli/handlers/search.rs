//! Search and tag query handlers.

use anyhow::Result;

use super::{Service, print_notes};
use crate::cli::output::{Output, OutputFormat, TagListing};
use crate::cli::{SearchArgs, TagFilterArgs, TagsArgs};

pub fn handle_search(args: &SearchArgs, service: &mut Service) -> Result<()> {
    let results = if args.title {
        service.notes_by_title(&args.query)
    } else if args.content {
        service.notes_by_content(&args.query)
    } else {
        service.search_notes(&args.query)
    };
    print_notes(&results, args.format, "No matching notes found.")
}

pub fn handle_tag_filter(args: &TagFilterArgs, service: &mut Service) -> Result<()> {
    let results = if let [tag] = args.tags.as_slice() {
        service.notes_by_tag(tag)
    } else {
        service.notes_by_tags(&args.tags, args.all)
    };
    print_notes(&results, args.format, "No notes with those tags.")
}

pub fn handle_tags(args: &TagsArgs, service: &Service) -> Result<()> {
    let tags = service.tag_counts();

    match args.format {
        OutputFormat::Human => {
            if tags.is_empty() {
                println!("No tags found.");
            } else {
                for (tag, count) in &tags {
                    if args.counts {
                        println!("{} ({})", tag, count);
                    } else {
                        println!("{}", tag);
                    }
                }
            }
        }
        OutputFormat::Json => {
            let listings: Vec<TagListing> = tags
                .into_iter()
                .map(|(name, count)| TagListing {
                    name,
                    count: args.counts.then_some(count),
                })
                .collect();
            Output::new(listings).print()?;
        }
    }
    Ok(())
}
