//! Corpus-wide summary
//!
//! An explicit fold over stored documents; nothing here is cached between
//! runs.

use docgraph_graph::UNKNOWN_STATUS;
use docgraph_record::DocumentFile;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Author name without the address part
///
/// `"Pieter Wuille <pieter.wuille@gmail.com>"` → `"Pieter Wuille"`
#[must_use]
pub fn author_name(entry: &str) -> &str {
    entry.split('<').next().unwrap_or(entry).trim()
}

/// Aggregates over a set of stored documents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusSummary {
    /// Documents folded in
    pub total_documents: usize,
    /// Documents per status
    pub status_counts: BTreeMap<String, usize>,
    /// Documents per type
    pub type_counts: BTreeMap<String, usize>,
    /// Summed word counts, most frequent first
    pub word_counts: IndexMap<String, u64>,
    /// Documents per author, most prolific first, ties in first-seen order
    pub top_authors: IndexMap<String, usize>,
}

impl CorpusSummary {
    /// Fold one document in
    #[must_use]
    pub fn add(mut self, file: &DocumentFile) -> Self {
        let preamble = file.preamble();
        self.total_documents += 1;

        let status = preamble.text("status").unwrap_or(UNKNOWN_STATUS);
        *self.status_counts.entry(status.to_string()).or_default() += 1;
        let kind = preamble.text("type").unwrap_or(UNKNOWN_STATUS);
        *self.type_counts.entry(kind.to_string()).or_default() += 1;

        if let Some(insights) = &file.insights {
            for (word, count) in &insights.word_list {
                *self.word_counts.entry(word.clone()).or_default() += count;
            }
        }

        for author in preamble.list("author") {
            let name = author_name(author);
            if name.is_empty() {
                continue;
            }
            *self.top_authors.entry(name.to_string()).or_default() += 1;
        }
        self
    }

    /// Sort rankings and keep the `top` most prolific authors
    #[must_use]
    pub fn finish(mut self, top: usize) -> Self {
        self.word_counts.sort_by(|_, a, _, b| b.cmp(a));
        self.top_authors.sort_by(|_, a, _, b| b.cmp(a));
        self.top_authors.truncate(top);
        self
    }

    /// Fold a whole corpus
    #[must_use]
    pub fn from_documents<'a, I>(documents: I, top: usize) -> Self
    where
        I: IntoIterator<Item = &'a DocumentFile>,
    {
        documents
            .into_iter()
            .fold(Self::default(), Self::add)
            .finish(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgraph_record::{Insights, Preamble};
    use pretty_assertions::assert_eq;

    fn doc(status: Option<&str>, authors: &[&str], words: &[(&str, u64)]) -> DocumentFile {
        let mut preamble = Preamble::new();
        if let Some(status) = status {
            preamble.set("status", status.into());
        }
        preamble.set("type", "Standards Track".into());
        preamble.set(
            "author",
            authors.iter().map(|a| (*a).to_string()).collect::<Vec<_>>().into(),
        );
        let mut file = DocumentFile::new(preamble);
        file.insights = Some(Insights {
            word_list: words.iter().map(|(w, c)| ((*w).to_string(), *c)).collect(),
            ..Insights::default()
        });
        file
    }

    #[test]
    fn author_name_drops_address() {
        assert_eq!(author_name("Pieter Wuille <pieter.wuille@gmail.com>"), "Pieter Wuille");
        assert_eq!(author_name("  Satoshi  "), "Satoshi");
    }

    #[test]
    fn folds_counts() {
        let docs = vec![
            doc(Some("Final"), &["Alice <a@x>", "Bob"], &[("key", 2), ("tx", 1)]),
            doc(Some("Draft"), &["Alice"], &[("tx", 5)]),
            doc(None, &["Carol <c@x>"], &[]),
        ];
        let summary = CorpusSummary::from_documents(&docs, 2);

        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.status_counts.get("Final"), Some(&1));
        assert_eq!(summary.status_counts.get(UNKNOWN_STATUS), Some(&1));
        assert_eq!(summary.type_counts.get("Standards Track"), Some(&3));
        assert_eq!(
            summary.word_counts.iter().map(|(k, v)| (k.as_str(), *v)).collect::<Vec<_>>(),
            vec![("tx", 6), ("key", 2)]
        );
        assert_eq!(
            summary.top_authors.iter().map(|(k, v)| (k.as_str(), *v)).collect::<Vec<_>>(),
            vec![("Alice", 2), ("Bob", 1)]
        );
    }

    #[test]
    fn author_ties_keep_first_seen_order() {
        let docs = vec![
            doc(None, &["Dave", "Carol <c@x>"], &[]),
            doc(None, &["Erin", "Carol"], &[]),
            doc(None, &["Erin"], &[]),
        ];
        let summary = CorpusSummary::from_documents(&docs, 3);
        assert_eq!(
            summary.top_authors.iter().map(|(k, v)| (k.as_str(), *v)).collect::<Vec<_>>(),
            vec![("Carol", 2), ("Erin", 2), ("Dave", 1)]
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["top_authors"]["Carol"], 2);
    }

    #[test]
    fn empty_corpus() {
        let summary = CorpusSummary::from_documents(std::iter::empty(), 10);
        assert_eq!(summary, CorpusSummary::default());
    }
}
