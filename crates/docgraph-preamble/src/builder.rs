//! Record building
//!
//! Turns a parsed header and its compliance report into a schema-ordered
//! [`Preamble`], then resolves the canonical identifier.

use crate::compliance::ComplianceReport;
use crate::error::RecordError;
use crate::header::ParsedHeader;
use docgraph_record::{DocumentRecord, Preamble};

/// Record builder
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder;

impl RecordBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the ordered preamble
    ///
    /// Required fields come first, then optional fields, each in schema order;
    /// absent fields are null and the score comes last. Keys outside the
    /// schema are dropped.
    #[must_use]
    pub fn build(&self, header: &ParsedHeader, report: &ComplianceReport) -> Preamble {
        let mut preamble = Preamble::from_fields(
            header
                .fields
                .iter()
                .map(|(k, v)| (k.as_str(), Some(v.clone()))),
        );
        preamble.set_compliance_score(report.score());
        preamble
    }

    /// Resolve the identifier of a built preamble
    ///
    /// # Errors
    /// [`RecordError::UnresolvedIdentifier`] if the identifier is absent or
    /// not purely numeric. The error keeps the preamble so the caller can
    /// route it to the unresolved bucket.
    pub fn resolve(&self, preamble: Preamble) -> Result<DocumentRecord, RecordError> {
        match preamble.identifier() {
            Ok(id) => Ok(DocumentRecord::new(id, preamble)),
            Err(source) => Err(RecordError::UnresolvedIdentifier {
                raw: preamble.raw_identifier().map(str::to_string),
                source,
                preamble: Box::new(preamble),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ComplianceChecker;
    use crate::header::HeaderParser;
    use docgraph_record::{DocumentFile, DocumentId, FieldValue, IdError, SCORE_KEY};
    use pretty_assertions::assert_eq;

    const DOC: &str = "<pre>
  BIP: 0009
  Title: Version bits
  Author: Pieter Wuille
  Status: Final
  Requires: 1, bip-0002
  Proposed-Replacement: ignored
</pre>
==Abstract==
";

    fn build(text: &str) -> Preamble {
        let header = HeaderParser::new().parse(text).unwrap();
        let report = ComplianceChecker::new().check(&header, text);
        RecordBuilder::new().build(&header, &report)
    }

    #[test]
    fn absent_fields_are_null_and_unknown_dropped() {
        let preamble = build(DOC);
        let keys: Vec<_> = preamble.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 16);
        assert!(!keys.contains(&"proposed_replacement"));
        assert!(preamble.get("layer").is_none());
        assert_eq!(preamble.text("requires"), Some("1, bip-0002"));
    }

    #[test]
    fn score_is_attached() {
        let preamble = build(DOC);
        // 4 required fields + 1 heading
        assert_eq!(preamble.compliance_score(), Some(29.41));
    }

    #[test]
    fn resolves_zero_padded_identifier() {
        let record = RecordBuilder::new().resolve(build(DOC)).unwrap();
        assert_eq!(record.id, DocumentId::new(9));
        assert_eq!(record.id.storage_key("bip-"), "bip-0009");
    }

    #[test]
    fn non_numeric_identifier_is_unresolved() {
        let preamble = build("<pre>\n  BIP: XX\n  Title: Draft\n</pre>");
        let err = RecordBuilder::new().resolve(preamble).unwrap_err();
        match &err {
            RecordError::UnresolvedIdentifier { raw, source, .. } => {
                assert_eq!(raw.as_deref(), Some("XX"));
                assert_eq!(source, &IdError::NotNumeric("XX".into()));
            }
        }
        assert_eq!(err.preamble().text("title"), Some("Draft"));
    }

    #[test]
    fn missing_identifier_is_unresolved() {
        let preamble = build("<pre>\n  Title: Nameless\n</pre>");
        let err = RecordBuilder::new().resolve(preamble).unwrap_err();
        assert!(matches!(
            err,
            RecordError::UnresolvedIdentifier { raw: None, source: IdError::Empty, .. }
        ));
    }

    #[test]
    fn record_round_trips_through_stored_form() {
        let text = "<pre>
  BIP: 340
  Title: Schnorr Signatures
  Author: Pieter Wuille
          Jonas Nick
  Comments-URI: https://example.org/c
  Status: Final
  Type: Standards Track
  Created: 2020-01-19
  License: BSD-2-Clause
  Superseded-By: 9999
</pre>
==Abstract==
";
        let preamble = build(text);
        let json = serde_json::to_string_pretty(&DocumentFile::new(preamble.clone())).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let stored = &value["raw"]["preamble"];
        let reparsed: Preamble = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(reparsed, preamble);
        assert_eq!(
            reparsed.get("author"),
            Some(&FieldValue::List(vec!["Pieter Wuille".into(), "Jonas Nick".into()]))
        );

        // score is recomputable from the source text
        assert_eq!(stored[SCORE_KEY].as_f64(), build(text).compliance_score());
    }
}
