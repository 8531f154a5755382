//! Index-free search by scanning every note.

use super::engine::SearchEngine;
use super::tokenize::extract_words;
use crate::domain::Note;

/// Scans the full note set on every query.
///
/// Useful for tiny collections and as a reference for the indexed engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearSearch;

impl LinearSearch {
    pub fn new() -> Self {
        Self
    }
}

impl SearchEngine for LinearSearch {
    fn search<'a>(&mut self, notes: &'a [Note], query: &str) -> Vec<&'a Note> {
        let words = extract_words(query);
        let lower = query.to_lowercase();
        notes
            .iter()
            .filter(|note| {
                let title_words = extract_words(note.title());
                let content_words = extract_words(note.content());
                words
                    .iter()
                    .any(|w| title_words.contains(w) || content_words.contains(w))
                    || (!lower.is_empty()
                        && note.tags().iter().any(|t| t.normalized().contains(&lower)))
            })
            .collect()
    }

    fn search_by_tag<'a>(&mut self, notes: &'a [Note], tag: &str) -> Vec<&'a Note> {
        notes.iter().filter(|n| n.has_tag(tag)).collect()
    }

    fn search_by_title<'a>(&mut self, notes: &'a [Note], title: &str) -> Vec<&'a Note> {
        let lower = title.to_lowercase();
        notes
            .iter()
            .filter(|n| n.title().to_lowercase().contains(&lower))
            .collect()
    }

    fn search_by_content<'a>(&mut self, notes: &'a [Note], content: &str) -> Vec<&'a Note> {
        let lower = content.to_lowercase();
        notes
            .iter()
            .filter(|n| n.content().to_lowercase().contains(&lower))
            .collect()
    }
}
