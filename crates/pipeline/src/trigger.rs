//! Trigger phrase detection and query extraction.

use tracing::debug;

/// Find the search query in already-normalized text.
///
/// Phrases are tried in list order and the first one that occurs anywhere
/// wins, even if a later phrase occurs earlier in the text. The query starts
/// at the match (the phrase itself is kept) and is cut to `max_words`
/// space-separated tokens. Matching is a plain substring search, so an empty
/// phrase matches at index 0.
pub fn detect_query<S: AsRef<str>>(
    normalized: &str,
    phrases: &[S],
    max_words: usize,
) -> Option<String> {
    let (phrase, index) = phrases
        .iter()
        .map(AsRef::as_ref)
        .find_map(|p| normalized.find(p).map(|i| (p, i)))?;

    debug!(phrase, index, "Trigger phrase found");

    let query = normalized[index..]
        .split(' ')
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");

    (!query.is_empty()).then_some(query)
}
