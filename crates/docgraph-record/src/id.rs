//! Document identifiers and normalized reference targets
//!
//! Provides [`DocumentId`] for resolved documents and [`CanonicalRef`] for
//! anything a document points at (which may or may not resolve to a record).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Errors resolving a document identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// Identifier field is missing or empty
    #[error("identifier is empty")]
    Empty,

    /// Identifier is not purely numeric
    #[error("identifier is not numeric: '{0}'")]
    NotNumeric(String),

    /// Identifier does not fit the numeric range
    #[error("identifier out of range: '{0}'")]
    OutOfRange(String),
}

/// Canonical numeric document identifier
///
/// Compared without leading zeros; rendered zero-padded only for storage keys.
///
/// # Examples
/// - `"0032"` → `32`, storage key `bip-0032`
/// - `"341"` → `341`, storage key `bip-0341`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u32);

impl DocumentId {
    /// Create identifier from its numeric value
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Storage key: prefix followed by the id zero-padded to 4 digits
    #[inline]
    #[must_use]
    pub fn storage_key(self, prefix: &str) -> String {
        format!("{prefix}{:04}", self.0)
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::NotNumeric(s.to_string()));
        }
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| IdError::OutOfRange(s.to_string()))
    }
}

/// Normalized reference target
///
/// Numeric tokens lose their leading zeros so `"0032"` and `"32"` compare
/// equal. Tokens that are not numeric are kept verbatim so dangling, oddly
/// written references survive into the graph instead of being dropped.
///
/// Ordering puts numbered references first, in numeric order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalRef {
    /// Numeric reference
    Numbered(u32),
    /// Non-numeric reference, trimmed
    Opaque(String),
}

impl CanonicalRef {
    /// Canonicalize a single token
    ///
    /// Returns `None` for empty or whitespace-only tokens.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = token.parse::<u32>() {
                return Some(Self::Numbered(n));
            }
        }
        Some(Self::Opaque(token.to_string()))
    }

    /// Resolve to a document id if numeric
    #[inline]
    #[must_use]
    pub fn as_document_id(&self) -> Option<DocumentId> {
        match self {
            Self::Numbered(n) => Some(DocumentId(*n)),
            Self::Opaque(_) => None,
        }
    }

    /// Whether this reference points at `id`
    #[inline]
    #[must_use]
    pub fn is_document(&self, id: DocumentId) -> bool {
        self.as_document_id() == Some(id)
    }
}

impl From<DocumentId> for CanonicalRef {
    fn from(id: DocumentId) -> Self {
        Self::Numbered(id.0)
    }
}

impl Display for CanonicalRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(n) => write!(f, "{n}"),
            Self::Opaque(s) => f.write_str(s),
        }
    }
}

impl Serialize for CanonicalRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("empty reference"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_drops_leading_zeros() {
        let id: DocumentId = "0032".parse().unwrap();
        assert_eq!(id.get(), 32);
        assert_eq!(id.to_string(), "32");
    }

    #[test]
    fn document_id_storage_key_is_padded() {
        assert_eq!(DocumentId::new(2).storage_key("bip-"), "bip-0002");
        assert_eq!(DocumentId::new(12345).storage_key("bip-"), "bip-12345");
    }

    #[test]
    fn document_id_rejects_non_numeric() {
        assert_eq!("".parse::<DocumentId>(), Err(IdError::Empty));
        assert!(matches!(
            "XX".parse::<DocumentId>(),
            Err(IdError::NotNumeric(_))
        ));
        assert!(matches!(
            "-3".parse::<DocumentId>(),
            Err(IdError::NotNumeric(_))
        ));
        assert!(matches!(
            "99999999999".parse::<DocumentId>(),
            Err(IdError::OutOfRange(_))
        ));
    }

    #[test]
    fn canonical_ref_numeric_and_opaque() {
        assert_eq!(CanonicalRef::parse(" 0016 "), Some(CanonicalRef::Numbered(16)));
        assert_eq!(
            CanonicalRef::parse("draft-x"),
            Some(CanonicalRef::Opaque("draft-x".into()))
        );
        assert_eq!(CanonicalRef::parse("   "), None);
    }

    #[test]
    fn canonical_ref_orders_numerically() {
        let mut refs = vec![
            CanonicalRef::Opaque("abc".into()),
            CanonicalRef::Numbered(100),
            CanonicalRef::Numbered(16),
        ];
        refs.sort();
        assert_eq!(
            refs,
            vec![
                CanonicalRef::Numbered(16),
                CanonicalRef::Numbered(100),
                CanonicalRef::Opaque("abc".into()),
            ]
        );
    }

    #[test]
    fn canonical_ref_serializes_as_string() {
        let json = serde_json::to_string(&CanonicalRef::Numbered(39)).unwrap();
        assert_eq!(json, "\"39\"");
        let back: CanonicalRef = serde_json::from_str("\"0039\"").unwrap();
        assert_eq!(back, CanonicalRef::Numbered(39));
    }

    #[test]
    fn canonical_ref_matches_document() {
        let id = DocumentId::new(7);
        assert!(CanonicalRef::from(id).is_document(id));
        assert!(!CanonicalRef::Opaque("7a".into()).is_document(id));
    }
}
