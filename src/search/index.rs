//! Inverted-index search engine with a bounded result cache.

use super::cache::{CacheKey, QueryKind, ResultCache};
use super::engine::{IndexedSearch, SearchEngine};
use super::tokenize::extract_words;
use crate::domain::{Note, NoteId};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

type PostingMap = HashMap<String, BTreeSet<NoteId>>;

/// Inverted indexes over tags, title words and content words.
///
/// The index does not own notes. It records each note's position in the
/// slice passed to [`IndexedSearch::build_indexes`], and queries resolve
/// positions against the slice they are given. Those positions are only
/// meaningful until the next rebuild; entries whose id no longer matches
/// the slice are skipped.
///
/// Results are ordered by position in the note slice.
#[derive(Debug)]
pub struct SearchIndex {
    tag_index: PostingMap,
    word_index: PostingMap,
    title_index: PostingMap,
    positions: HashMap<NoteId, usize>,
    cache: ResultCache,
    built: bool,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::with_cache_capacity(super::cache::DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            tag_index: HashMap::new(),
            word_index: HashMap::new(),
            title_index: HashMap::new(),
            positions: HashMap::new(),
            cache: ResultCache::new(capacity),
            built: false,
        }
    }

    /// Number of distinct indexed tags.
    pub fn tag_count(&self) -> usize {
        self.tag_index.len()
    }

    /// Number of distinct indexed content words.
    pub fn word_count(&self) -> usize {
        self.word_index.len()
    }

    /// Builds indexes on first use when queries arrive before any build.
    fn ensure_built(&mut self, notes: &[Note]) {
        if self.positions.is_empty() && !notes.is_empty() {
            self.build_indexes(notes);
        }
    }

    /// Returns cached ids for `key`, resolved against `notes`.
    fn cached<'a>(&self, notes: &'a [Note], key: &CacheKey) -> Option<Vec<&'a Note>> {
        self.cache.get(key).map(|ids| self.resolve(notes, ids))
    }

    fn resolve<'a>(&self, notes: &'a [Note], ids: &[NoteId]) -> Vec<&'a Note> {
        ids.iter()
            .filter_map(|id| {
                let pos = *self.positions.get(id)?;
                notes.get(pos).filter(|n| n.id() == id)
            })
            .collect()
    }

    /// Sorts a deduplicated id set by note position.
    fn ordered(&self, ids: BTreeSet<NoteId>) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = ids.into_iter().collect();
        ids.sort_by_key(|id| self.positions.get(id).copied().unwrap_or(usize::MAX));
        ids
    }

    fn store<'a>(&mut self, notes: &'a [Note], key: CacheKey, ids: Vec<NoteId>) -> Vec<&'a Note> {
        let found = self.resolve(notes, &ids);
        self.cache.insert(key, ids);
        found
    }

    /// Union of postings for every query word in `index`.
    fn union_words(index: &PostingMap, words: &[String]) -> BTreeSet<NoteId> {
        words
            .iter()
            .filter_map(|w| index.get(w))
            .flat_map(|ids| ids.iter().cloned())
            .collect()
    }

    /// Index candidates, then keep only notes whose field truly contains the
    /// query as a substring.
    fn verified<'a>(
        &mut self,
        notes: &'a [Note],
        kind: QueryKind,
        query: &str,
        field: fn(&Note) -> &str,
    ) -> Vec<&'a Note> {
        let key = CacheKey::new(kind, query);
        if let Some(hit) = self.cached(notes, &key) {
            return hit;
        }
        self.ensure_built(notes);

        let index = match kind {
            QueryKind::Title => &self.title_index,
            _ => &self.word_index,
        };
        let candidates = Self::union_words(index, &extract_words(query));
        let lower = query.to_lowercase();
        let ids: BTreeSet<NoteId> = candidates
            .into_iter()
            .filter(|id| {
                self.positions
                    .get(id)
                    .and_then(|&pos| notes.get(pos))
                    .is_some_and(|n| field(n).to_lowercase().contains(&lower))
            })
            .collect();

        let ids = self.ordered(ids);
        self.store(notes, key, ids)
    }
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_posting(index: &mut PostingMap, key: String, id: &NoteId) {
    index.entry(key).or_default().insert(id.clone());
}

impl SearchEngine for SearchIndex {
    fn search<'a>(&mut self, notes: &'a [Note], query: &str) -> Vec<&'a Note> {
        let key = CacheKey::new(QueryKind::General, query);
        if let Some(hit) = self.cached(notes, &key) {
            return hit;
        }
        self.ensure_built(notes);

        let words = extract_words(query);
        let mut ids = Self::union_words(&self.word_index, &words);
        ids.extend(Self::union_words(&self.title_index, &words));

        // Tags match the whole query as a substring, not word by word. An
        // empty query matches no tags, although "" is a substring of all.
        let lower = query.to_lowercase();
        if !lower.is_empty() {
            for (tag, tagged) in &self.tag_index {
                if tag.contains(&lower) {
                    ids.extend(tagged.iter().cloned());
                }
            }
        }

        let ids = self.ordered(ids);
        self.store(notes, key, ids)
    }

    fn search_by_tag<'a>(&mut self, notes: &'a [Note], tag: &str) -> Vec<&'a Note> {
        let key = CacheKey::new(QueryKind::Tag, tag);
        if let Some(hit) = self.cached(notes, &key) {
            return hit;
        }
        self.ensure_built(notes);

        let ids = self
            .tag_index
            .get(&tag.to_lowercase())
            .cloned()
            .unwrap_or_default();
        let ids = self.ordered(ids);
        self.store(notes, key, ids)
    }

    fn search_by_title<'a>(&mut self, notes: &'a [Note], title: &str) -> Vec<&'a Note> {
        self.verified(notes, QueryKind::Title, title, Note::title)
    }

    fn search_by_content<'a>(&mut self, notes: &'a [Note], content: &str) -> Vec<&'a Note> {
        self.verified(notes, QueryKind::Content, content, Note::content)
    }
}

impl IndexedSearch for SearchIndex {
    fn build_indexes(&mut self, notes: &[Note]) {
        self.tag_index.clear();
        self.word_index.clear();
        self.title_index.clear();
        self.positions.clear();
        self.cache.clear();

        for (pos, note) in notes.iter().enumerate() {
            let id = note.id();
            self.positions.insert(id.clone(), pos);

            for tag in note.tags() {
                insert_posting(&mut self.tag_index, tag.normalized(), id);
            }
            for word in extract_words(note.content()) {
                insert_posting(&mut self.word_index, word, id);
            }
            for word in extract_words(note.title()) {
                insert_posting(&mut self.title_index, word, id);
            }
        }

        self.built = true;
        debug!(
            notes = notes.len(),
            words = self.word_index.len(),
            tags = self.tag_index.len(),
            "rebuilt search indexes"
        );
    }

    fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    fn search_multiple_tags<'a>(
        &mut self,
        notes: &'a [Note],
        tags: &[String],
        match_all: bool,
    ) -> Vec<&'a Note> {
        let kind = if match_all {
            QueryKind::MultiTagAll
        } else {
            QueryKind::MultiTagAny
        };
        let key = CacheKey::with_terms(kind, tags);
        if let Some(hit) = self.cached(notes, &key) {
            return hit;
        }
        self.ensure_built(notes);

        let empty = BTreeSet::new();
        let sets: Vec<&BTreeSet<NoteId>> = tags
            .iter()
            .map(|t| self.tag_index.get(&t.to_lowercase()).unwrap_or(&empty))
            .collect();

        let ids: BTreeSet<NoteId> = if match_all {
            match sets.split_first() {
                Some((first, rest)) => first
                    .iter()
                    .filter(|id| rest.iter().all(|s| s.contains(*id)))
                    .cloned()
                    .collect(),
                None => BTreeSet::new(),
            }
        } else {
            sets.iter().flat_map(|s| s.iter().cloned()).collect()
        };

        let ids = self.ordered(ids);
        self.store(notes, key, ids)
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn tag_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .tag_index
            .iter()
            .map(|(tag, ids)| (tag.clone(), ids.len()))
            .collect();
        counts.sort();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tag;
    use crate::search::LinearSearch;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn note(title: &str, content: &str, tags: &[&str]) -> Note {
        Note::new(
            title,
            content,
            tags.iter().map(|t| Tag::new(t).unwrap()).collect(),
        )
    }

    fn titles(found: Vec<&Note>) -> Vec<String> {
        found.into_iter().map(|n| n.title().to_string()).collect()
    }

    fn title_set(found: Vec<&Note>) -> HashSet<String> {
        titles(found).into_iter().collect()
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn abc() -> Vec<Note> {
        vec![
            note("A", "x", &[]),
            note("B", "y", &["foo"]),
            note("C", "z", &["foo", "bar"]),
        ]
    }

    fn meeting_notes() -> Vec<Note> {
        vec![
            note("Client meeting", "Discuss project X", &["work", "client"]),
            note("Shopping list", "Buy bread and milk", &["personal"]),
            note("Project idea", "Build a mobile app", &["work", "project"]),
        ]
    }

    fn built(notes: &[Note]) -> SearchIndex {
        let mut index = SearchIndex::new();
        index.build_indexes(notes);
        index
    }

    #[test]
    fn search_by_tag_scenario() {
        let notes = abc();
        let mut index = built(&notes);
        assert_eq!(title_set(index.search_by_tag(&notes, "foo")), set(&["B", "C"]));
        assert_eq!(title_set(index.search_by_tag(&notes, "FOO")), set(&["B", "C"]));
        assert!(index.search_by_tag(&notes, "fo").is_empty());
    }

    #[test]
    fn multiple_tags_all_and_any() {
        let notes = abc();
        let mut index = built(&notes);
        let tags = vec!["foo".to_string(), "bar".to_string()];
        assert_eq!(titles(index.search_multiple_tags(&notes, &tags, true)), vec!["C"]);
        assert_eq!(
            title_set(index.search_multiple_tags(&notes, &tags, false)),
            set(&["B", "C"])
        );
    }

    #[test]
    fn multiple_tags_all_with_absent_tag_is_empty() {
        let notes = abc();
        let mut index = built(&notes);
        let tags = vec!["foo".to_string(), "missing".to_string()];
        assert!(index.search_multiple_tags(&notes, &tags, true).is_empty());
        assert!(index.search_multiple_tags(&notes, &[], true).is_empty());
        assert!(index.search_multiple_tags(&notes, &[], false).is_empty());
    }

    #[test]
    fn tag_containing_comma_is_cached_apart_from_split_tags() {
        let notes = vec![note("Comma", "", &["a,b"]), note("A", "", &["a"])];
        let mut index = built(&notes);

        let joined = vec!["a,b".to_string()];
        let split = vec!["a".to_string(), "b".to_string()];
        assert_eq!(titles(index.search_multiple_tags(&notes, &joined, false)), vec!["Comma"]);
        assert_eq!(titles(index.search_multiple_tags(&notes, &split, false)), vec!["A"]);
        assert_eq!(titles(index.search_multiple_tags(&notes, &joined, false)), vec!["Comma"]);
    }

    #[test]
    fn search_matches_title_content_and_tags() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        assert_eq!(
            title_set(index.search(&notes, "project")),
            set(&["Client meeting", "Project idea"])
        );
        assert_eq!(titles(index.search(&notes, "bread")), vec!["Shopping list"]);
        assert_eq!(
            title_set(index.search(&notes, "work")),
            set(&["Client meeting", "Project idea"])
        );
        assert!(index.search(&notes, "xyz123").is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        let upper = titles(index.search(&notes, "PROJECT"));
        let lower = titles(index.search(&notes, "project"));
        assert_eq!(upper, lower);
    }

    #[test]
    fn search_unions_query_words() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        assert_eq!(
            title_set(index.search(&notes, "milk, app!")),
            set(&["Shopping list", "Project idea"])
        );
    }

    #[test]
    fn tag_branch_uses_whole_query_substring() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        // "pers" is not a word anywhere, but is a substring of the tag "personal".
        assert_eq!(titles(index.search(&notes, "pers")), vec!["Shopping list"]);
        // Two words never match a tag jointly.
        assert!(index.search(&notes, "pers onal").is_empty());
    }

    #[test]
    fn empty_query_returns_nothing() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        assert!(index.search(&notes, "").is_empty());
    }

    #[test]
    fn title_search_verifies_substring() {
        let notes = vec![
            note("Rust tips", "", &[]),
            note("Tips for rust removal", "", &[]),
        ];
        let mut index = built(&notes);
        // Both titles hold both words, only one holds the phrase.
        assert_eq!(titles(index.search_by_title(&notes, "rust tips")), vec!["Rust tips"]);
    }

    #[test]
    fn content_search_verifies_substring() {
        let notes = vec![
            note("one", "the quick brown fox", &[]),
            note("two", "brown and quick", &[]),
        ];
        let mut index = built(&notes);
        assert_eq!(titles(index.search_by_content(&notes, "quick brown")), vec!["one"]);
        assert!(index.search_by_content(&notes, "qui").is_empty());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        let queries = ["project", "work", "bread", "client", "nothing"];
        let first: Vec<_> = queries.iter().map(|q| titles(index.search(&notes, q))).collect();

        index.build_indexes(&notes);
        index.build_indexes(&notes);
        let second: Vec<_> = queries.iter().map(|q| titles(index.search(&notes, q))).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn repeated_query_is_served_from_cache_with_same_result() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        let first = titles(index.search(&notes, "work"));
        assert_eq!(index.cache_len(), 1);
        let second = titles(index.search(&notes, "work"));
        assert_eq!(index.cache_len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn rebuild_clears_cache() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        index.search(&notes, "work");
        index.search_by_tag(&notes, "client");
        assert_eq!(index.cache_len(), 2);
        index.build_indexes(&notes);
        assert_eq!(index.cache_len(), 0);
    }

    #[test]
    fn invalidate_cache_keeps_indexes() {
        let notes = meeting_notes();
        let mut index = built(&notes);
        index.search(&notes, "work");
        index.invalidate_cache();
        assert_eq!(index.cache_len(), 0);
        assert_eq!(index.search(&notes, "work").len(), 2);
    }

    #[test]
    fn cache_evicts_fifo_at_capacity() {
        let notes = meeting_notes();
        let mut index = SearchIndex::with_cache_capacity(2);
        index.build_indexes(&notes);
        index.search(&notes, "work");
        index.search(&notes, "bread");
        index.search(&notes, "client");
        assert_eq!(index.cache_len(), 2);
    }

    #[test]
    fn auto_builds_once_when_queried_before_build() {
        let notes = abc();
        let mut index = SearchIndex::new();
        assert!(!index.is_built());
        assert_eq!(title_set(index.search_by_tag(&notes, "foo")), set(&["B", "C"]));
        assert!(index.is_built());
    }

    #[test]
    fn stale_positions_are_skipped() {
        let notes = abc();
        let mut index = built(&notes);
        let shorter = vec![notes[2].clone()];
        // The index still expects C at position 2.
        assert!(index.search_by_tag(&shorter, "bar").is_empty());
    }

    #[test]
    fn results_follow_note_order() {
        let notes = vec![
            note("first", "shared", &[]),
            note("second", "shared", &[]),
            note("third", "shared", &[]),
        ];
        let mut index = built(&notes);
        assert_eq!(
            titles(index.search(&notes, "shared")),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn tag_lookup_agrees_with_linear_scan() {
        let notes = vec![
            note("1", "", &["Alpha", "beta"]),
            note("2", "", &["ALPHA"]),
            note("3", "", &["gamma"]),
            note("4", "", &[]),
        ];
        let mut index = built(&notes);
        let mut linear = LinearSearch::new();
        for tag in ["alpha", "Alpha", "BETA", "gamma", "delta", "alp"] {
            assert_eq!(
                titles(index.search_by_tag(&notes, tag)),
                titles(linear.search_by_tag(&notes, tag)),
                "tag {tag}"
            );
        }
    }

    #[test]
    fn index_counts_distinct_keys() {
        let notes = abc();
        let index = built(&notes);
        assert_eq!(index.tag_count(), 2);
        assert_eq!(index.word_count(), 3);
    }

    #[test]
    fn tag_counts_are_sorted_and_case_folded() {
        let notes = vec![
            note("1", "", &["Work", "home"]),
            note("2", "", &["work"]),
        ];
        let index = built(&notes);
        assert_eq!(
            index.tag_counts(),
            vec![("home".to_string(), 1), ("work".to_string(), 2)]
        );
    }
}
