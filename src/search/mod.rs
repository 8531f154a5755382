//! Note search: inverted indexes, linear scan and a FIFO result cache

mod cache;
mod engine;
mod index;
mod linear;
mod tokenize;

pub use cache::{CacheKey, DEFAULT_CACHE_CAPACITY, QueryKind, ResultCache};
pub use engine::{IndexedSearch, SearchEngine};
pub use index::SearchIndex;
pub use linear::LinearSearch;
pub use tokenize::extract_words;
