//! Cross-reference normalizer
//!
//! Three entry points share one canonical form ([`CanonicalRef`]):
//! - structured header fields (`Requires: bip-0032, 39`)
//! - free-text mentions in a document body (`see BIP 32`)
//! - single loose tokens, as returned by a dependency classifier

use crate::error::RefsError;
use crate::kind::RelationKind;
use crate::syntax::ReferenceSyntax;
use docgraph_record::{CanonicalRef, DocumentId, FieldValue, Preamble};
use regex::Regex;
use std::collections::BTreeSet;

const FIELD_SEPARATOR: char = ',';

/// Strip `prefix` from the start of `token`, ignoring ASCII case
fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = token.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        token.get(prefix.len()..)
    } else {
        None
    }
}

fn is_mention_separator(c: char) -> bool {
    c == '-' || c == '#' || c.is_whitespace()
}

/// Reference normalizer for one corpus syntax
#[derive(Debug, Clone)]
pub struct ReferenceNormalizer {
    syntax: ReferenceSyntax,
    mention: Regex,
}

impl ReferenceNormalizer {
    /// Create a normalizer for `syntax`
    ///
    /// # Errors
    /// [`RefsError::EmptyKeyword`] if the mention keyword is empty
    pub fn new(syntax: ReferenceSyntax) -> Result<Self, RefsError> {
        if syntax.mention_keyword.is_empty() {
            return Err(RefsError::EmptyKeyword);
        }
        let pattern = format!(
            r"\b{}[-#\s]?([0-9]+)\b",
            regex::escape(&syntax.mention_keyword)
        );
        let mention = Regex::new(&pattern)?;
        Ok(Self { syntax, mention })
    }

    /// Syntax this normalizer was built for
    #[inline]
    #[must_use]
    pub fn syntax(&self) -> &ReferenceSyntax {
        &self.syntax
    }

    /// Normalize one structured field value
    ///
    /// Comma-separated tokens are trimmed, lose the id prefix and leading
    /// zeros, and are deduplicated.
    #[must_use]
    pub fn field_refs(&self, value: &str) -> BTreeSet<CanonicalRef> {
        value
            .split(FIELD_SEPARATOR)
            .map(str::trim)
            .map(|token| {
                strip_prefix_ignore_case(token, &self.syntax.id_prefix).unwrap_or(token)
            })
            .filter_map(CanonicalRef::parse)
            .collect()
    }

    /// Normalized targets of every structured reference field
    ///
    /// Kinds whose field is null or empty are omitted.
    #[must_use]
    pub fn structured(&self, preamble: &Preamble) -> Vec<(RelationKind, BTreeSet<CanonicalRef>)> {
        RelationKind::STRUCTURED
            .into_iter()
            .filter_map(|kind| {
                let value = preamble.get(kind.field()?)?;
                let targets: BTreeSet<_> = match value {
                    FieldValue::Text(text) => self.field_refs(text),
                    FieldValue::List(items) => {
                        items.iter().flat_map(|item| self.field_refs(item)).collect()
                    }
                };
                tracing::trace!(%kind, count = targets.len(), "structured references");
                (!targets.is_empty()).then_some((kind, targets))
            })
            .collect()
    }

    /// Distinct documents mentioned in free text, sorted
    ///
    /// A mention of the document itself is excluded. Numbers beyond
    /// `u32::MAX` are not document ids and are skipped.
    #[must_use]
    pub fn mentions(&self, text: &str, own: Option<DocumentId>) -> Vec<CanonicalRef> {
        let found: BTreeSet<u32> = self
            .mention
            .captures_iter(text)
            .filter_map(|caps| {
                let digits = caps.get(1)?.as_str();
                match digits.parse::<u32>() {
                    Ok(n) => Some(n),
                    Err(_) => {
                        tracing::debug!(mention = digits, "mention number out of range");
                        None
                    }
                }
            })
            .filter(|&n| own.map_or(true, |id| id.get() != n))
            .collect();
        found.into_iter().map(CanonicalRef::Numbered).collect()
    }

    /// Normalize one loose token
    ///
    /// Accepts `32`, `0032`, `bip-32`, `BIP 32`, `BIP#32` and `BIP-0032`.
    /// Tokens that do not reduce to a number are kept verbatim.
    #[must_use]
    pub fn normalize_token(&self, token: &str) -> Option<CanonicalRef> {
        let token = token.trim();
        let rest = strip_prefix_ignore_case(token, &self.syntax.id_prefix)
            .or_else(|| {
                strip_prefix_ignore_case(token, &self.syntax.mention_keyword)
                    .map(|r| r.strip_prefix(is_mention_separator).unwrap_or(r))
            })
            .unwrap_or(token)
            .trim();
        match CanonicalRef::parse(rest) {
            Some(numbered @ CanonicalRef::Numbered(_)) => Some(numbered),
            _ => CanonicalRef::parse(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bip() -> ReferenceNormalizer {
        ReferenceNormalizer::new(ReferenceSyntax::default()).unwrap()
    }

    fn set(refs: &[u32]) -> BTreeSet<CanonicalRef> {
        refs.iter().copied().map(CanonicalRef::Numbered).collect()
    }

    #[test]
    fn strips_prefix_case_insensitively() {
        let normalizer =
            ReferenceNormalizer::new(ReferenceSyntax::new("document-", "ref")).unwrap();
        assert_eq!(normalizer.field_refs("document-0032, DOCUMENT-39"), set(&[32, 39]));
    }

    #[test]
    fn field_refs_dedupe_and_drop_empties() {
        assert_eq!(bip().field_refs("32, 0032, bip-32,, "), set(&[32]));
        assert!(bip().field_refs("").is_empty());
    }

    #[test]
    fn non_numeric_tokens_survive() {
        let refs = bip().field_refs("9, draft-xyz");
        assert_eq!(
            refs.into_iter().collect::<Vec<_>>(),
            vec![CanonicalRef::Numbered(9), CanonicalRef::Opaque("draft-xyz".into())]
        );
    }

    #[test]
    fn mentions_are_sorted_and_deduplicated() {
        let normalizer =
            ReferenceNormalizer::new(ReferenceSyntax::new("document-", "ref")).unwrap();
        assert_eq!(
            normalizer.mentions("See ref#0016 and ref 39.", None),
            vec![CanonicalRef::Numbered(16), CanonicalRef::Numbered(39)]
        );
        assert_eq!(
            bip().mentions("BIP-0032, BIP32 and BIP 9 (again BIP 32)", None),
            vec![CanonicalRef::Numbered(9), CanonicalRef::Numbered(32)]
        );
    }

    #[test]
    fn mentions_exclude_own_id() {
        let found = bip().mentions("This is BIP 141. It builds on BIP 9.", Some(DocumentId::new(141)));
        assert_eq!(found, vec![CanonicalRef::Numbered(9)]);
    }

    #[test]
    fn oversized_mention_numbers_are_skipped() {
        let found = bip().mentions("BIP 99999999999 and BIP 4294967295 and BIP 4", None);
        assert_eq!(
            found,
            vec![CanonicalRef::Numbered(4), CanonicalRef::Numbered(u32::MAX)]
        );
    }

    #[test]
    fn mention_keyword_is_case_sensitive_and_whole_word() {
        assert!(bip().mentions("bip 32 and XBIP 7 and BIPS 3", None).is_empty());
    }

    #[test]
    fn structured_reads_reference_fields() {
        let mut preamble = Preamble::new();
        preamble.set("requires", "bip-0009, 2".into());
        preamble.set("superseded_by", "340".into());
        preamble.set("replaces", "".into());
        assert_eq!(
            bip().structured(&preamble),
            vec![
                (RelationKind::Requires, set(&[2, 9])),
                (RelationKind::SupersededBy, set(&[340])),
            ]
        );
    }

    #[test]
    fn normalize_token_variants() {
        let normalizer = bip();
        for token in ["32", "0032", "bip-32", "BIP 32", "BIP-0032", "BIP#32", " Bip-32 "] {
            assert_eq!(
                normalizer.normalize_token(token),
                Some(CanonicalRef::Numbered(32)),
                "{token}"
            );
        }
        assert_eq!(
            normalizer.normalize_token("BIPs"),
            Some(CanonicalRef::Opaque("BIPs".into()))
        );
        assert_eq!(normalizer.normalize_token("  "), None);
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let err = ReferenceNormalizer::new(ReferenceSyntax::new("bip-", "")).unwrap_err();
        assert!(matches!(err, RefsError::EmptyKeyword));
    }

    #[test]
    fn keyword_is_matched_literally() {
        let normalizer = ReferenceNormalizer::new(ReferenceSyntax::new("x-", "R.")).unwrap();
        assert!(normalizer.mentions("RX 5", None).is_empty());
    }
}
