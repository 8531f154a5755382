//! Search capabilities: plain scanning engines and indexed engines.

use crate::domain::Note;

/// Queries over a note set.
///
/// Every method receives the current notes; unmatched queries return an
/// empty list rather than an error.
pub trait SearchEngine {
    /// Matches words of `query` against titles and content, and `query` as a
    /// whole against tags.
    fn search<'a>(&mut self, notes: &'a [Note], query: &str) -> Vec<&'a Note>;

    /// Notes carrying `tag`, ignoring case.
    fn search_by_tag<'a>(&mut self, notes: &'a [Note], tag: &str) -> Vec<&'a Note>;

    /// Notes whose title contains `title`, ignoring case.
    fn search_by_title<'a>(&mut self, notes: &'a [Note], title: &str) -> Vec<&'a Note>;

    /// Notes whose content contains `content`, ignoring case.
    fn search_by_content<'a>(&mut self, notes: &'a [Note], content: &str) -> Vec<&'a Note>;
}

/// A search engine backed by prebuilt indexes.
///
/// The index keeps no subscription to the note set: callers must invoke
/// `build_indexes` after every change, and pass that same slice to queries.
pub trait IndexedSearch: SearchEngine {
    /// Rebuilds every index from `notes` and empties the result cache.
    fn build_indexes(&mut self, notes: &[Note]);

    /// Drops cached query results without touching the indexes.
    fn invalidate_cache(&mut self);

    /// With `match_all`, notes carrying every tag; otherwise any of them.
    fn search_multiple_tags<'a>(
        &mut self,
        notes: &'a [Note],
        tags: &[String],
        match_all: bool,
    ) -> Vec<&'a Note>;

    /// Whether `build_indexes` has run since construction.
    fn is_built(&self) -> bool;

    /// Number of cached query results.
    fn cache_len(&self) -> usize;

    /// Lowercased tags with the number of notes carrying each, sorted by tag.
    fn tag_counts(&self) -> Vec<(String, usize)>;
}
