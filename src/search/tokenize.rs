//! Word extraction shared by indexing and querying.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static pattern is valid"));

/// Lowercases `text`, turns punctuation into spaces and splits on whitespace.
///
/// Word characters are Unicode letters, digits and `_`. Empty tokens are
/// dropped, so punctuation-only or blank input yields no words.
pub fn extract_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
