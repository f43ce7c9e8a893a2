//! Enrichment merge
//!
//! Merges externally supplied history and insights into a stored document.
//! The merge overwrites the `metadata` and `insights` sections and never
//! touches `raw`.

use chrono::{DateTime, Utc};
use docgraph_record::{DocumentFile, Insights, Metadata, Revision};
use std::collections::HashSet;

/// Format of `metadata_last_updated`
pub const UPDATE_STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build the metadata section from a newest-first history
#[must_use]
pub fn metadata_from_history(history: Vec<Revision>, now: DateTime<Utc>) -> Metadata {
    let contributors = history
        .iter()
        .map(|r| r.author.as_str())
        .collect::<HashSet<_>>()
        .len();
    Metadata {
        last_commit: history.first().map(|r| r.timestamp.clone()),
        total_commits: Some(history.len() as u64),
        metadata_last_updated: Some(now.format(UPDATE_STAMP_FORMAT).to_string()),
        git_history: history,
        contributors: Some(contributors as u64),
    }
}

/// Overwrite-merge of enrichment results
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichmentMerger;

impl EnrichmentMerger {
    /// Create new merger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Replace the metadata section, stamped with `now`
    pub fn merge_history(&self, file: &mut DocumentFile, history: Vec<Revision>, now: DateTime<Utc>) {
        file.metadata = Some(metadata_from_history(history, now));
    }

    /// Replace the insights section
    pub fn merge_insights(&self, file: &mut DocumentFile, insights: Insights) {
        file.insights = Some(insights);
    }

    /// Merge both sections, stamped with the current time
    pub fn merge(&self, file: &mut DocumentFile, history: Vec<Revision>, insights: Insights) {
        self.merge_history(file, history, Utc::now());
        self.merge_insights(file, insights);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use docgraph_record::{CanonicalRef, Dependencies, Preamble};
    use pretty_assertions::assert_eq;

    fn file() -> DocumentFile {
        let mut preamble = Preamble::new();
        preamble.set("bip", "32".into());
        preamble.set_compliance_score(47.06);
        DocumentFile::new(preamble)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn history_fills_metadata() {
        let history = vec![
            Revision::new("c3", "2024-03-01", "alice"),
            Revision::new("c2", "2024-02-01", "bob"),
            Revision::new("c1", "2024-01-01", "alice"),
        ];
        let metadata = metadata_from_history(history.clone(), now());
        assert_eq!(
            metadata,
            Metadata {
                last_commit: Some("2024-03-01".into()),
                total_commits: Some(3),
                metadata_last_updated: Some("2024-05-06T07:08:09".into()),
                git_history: history,
                contributors: Some(2),
            }
        );
    }

    #[test]
    fn empty_history_has_zero_contributors() {
        let metadata = metadata_from_history(Vec::new(), now());
        assert_eq!(metadata.last_commit, None);
        assert_eq!(metadata.total_commits, Some(0));
        assert_eq!(metadata.contributors, Some(0));
    }

    #[test]
    fn merge_overwrites_and_keeps_raw() {
        let mut doc = file();
        let merger = EnrichmentMerger::new();
        merger.merge_history(&mut doc, vec![Revision::new("a", "t", "x")], now());
        merger.merge_insights(
            &mut doc,
            Insights {
                dependencies: Dependencies::Known(vec![CanonicalRef::Numbered(1)]),
                ..Insights::default()
            },
        );
        merger.merge_history(&mut doc, Vec::new(), now());
        merger.merge_insights(&mut doc, Insights::default());

        assert_eq!(doc.raw, file().raw);
        assert_eq!(doc.contributors(), Some(0));
        assert!(doc.insights.as_ref().map_or(false, |i| i.dependencies.is_unknown()));
    }
}
