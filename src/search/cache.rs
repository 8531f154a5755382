//! Bounded FIFO cache of query results.

use crate::domain::NoteId;
use std::collections::{HashMap, VecDeque};

/// Default number of cached queries.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Which query method produced a cached result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    General,
    Tag,
    Title,
    Content,
    MultiTagAll,
    MultiTagAny,
}

/// Cache key: the query method plus the raw, unnormalized query terms.
///
/// Multi-tag queries keep each tag as its own term, so `["a,b"]` and
/// `["a", "b"]` never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: QueryKind,
    terms: Vec<String>,
}

impl CacheKey {
    pub fn new(kind: QueryKind, query: impl Into<String>) -> Self {
        Self {
            kind,
            terms: vec![query.into()],
        }
    }

    /// Key for a query over several terms, in the order given.
    pub fn with_terms(kind: QueryKind, terms: &[String]) -> Self {
        Self {
            kind,
            terms: terms.to_vec(),
        }
    }
}

/// Result cache with first-in-first-out eviction.
///
/// When full, inserting a new key evicts the oldest inserted key. Reads do
/// not refresh an entry's age.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<CacheKey, Vec<NoteId>>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl ResultCache {
    /// Creates a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&[NoteId]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: CacheKey, ids: Vec<NoteId>) {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = ids;
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, ids);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
