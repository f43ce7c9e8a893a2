//! Body-derived insights

use docgraph_record::{Dependencies, DocumentId, Insights};
use docgraph_refs::ReferenceNormalizer;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// Words left out of word counts
pub const STOP_WORDS: [&str; 29] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "you", "your", "this",
    "or",
];

/// Lower-cased word counts, most frequent first
///
/// Ties keep first-seen order.
#[must_use]
pub fn word_list(text: &str) -> IndexMap<String, u64> {
    let lowered = text.to_lowercase();
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if STOP_WORDS.contains(&word) {
            continue;
        }
        *counts.entry(word.to_string()).or_default() += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

/// Assemble the insights section for one document
#[must_use]
pub fn derive_insights(
    body: &str,
    own: DocumentId,
    normalizer: &ReferenceNormalizer,
    dependencies: Dependencies,
) -> Insights {
    Insights {
        word_list: word_list(body),
        references: normalizer.mentions(body, Some(own)),
        dependencies,
    }
}
