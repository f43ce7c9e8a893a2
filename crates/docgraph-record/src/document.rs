//! Per-document output file
//!
//! ```text
//! {
//!   "raw":      { "preamble": { ...fields, "compliance_score": 88.24 } },
//!   "metadata": { "last_commit": ..., "git_history": [[rev, ts, author]], ... },
//!   "insights": { "word_list": {...}, "references": [...], "dependencies": [...] }
//! }
//! ```

use crate::id::{CanonicalRef, DocumentId};
use crate::preamble::Preamble;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel written in place of a dependency list that could not be obtained
pub const DEPENDENCIES_UNKNOWN_SENTINEL: &str = "error";

/// Resolved record: canonical identifier plus its preamble
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    /// Canonical identifier
    pub id: DocumentId,
    /// Normalized header fields and score
    pub preamble: Preamble,
}

impl DocumentRecord {
    /// Pair an identifier with its preamble
    #[inline]
    #[must_use]
    pub fn new(id: DocumentId, preamble: Preamble) -> Self {
        Self { id, preamble }
    }
}

/// Complete stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Values extracted from the document itself
    pub raw: RawSection,
    /// External provenance (version history)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Derived and externally classified insights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
}

impl DocumentFile {
    /// Wrap a freshly built preamble
    #[inline]
    #[must_use]
    pub fn new(preamble: Preamble) -> Self {
        Self {
            raw: RawSection { preamble },
            metadata: None,
            insights: None,
        }
    }

    /// Shortcut to the preamble
    #[inline]
    #[must_use]
    pub fn preamble(&self) -> &Preamble {
        &self.raw.preamble
    }

    /// Contributor count from metadata, if known
    #[inline]
    #[must_use]
    pub fn contributors(&self) -> Option<u64> {
        self.metadata.as_ref().and_then(|m| m.contributors)
    }
}

/// `raw` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSection {
    /// Normalized header fields
    pub preamble: Preamble,
}

/// Version-history provenance supplied by an external source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the newest revision
    pub last_commit: Option<String>,
    /// Number of revisions
    pub total_commits: Option<u64>,
    /// When this section was last refreshed (UTC, `%Y-%m-%dT%H:%M:%S`)
    pub metadata_last_updated: Option<String>,
    /// Revisions, newest first
    #[serde(default)]
    pub git_history: Vec<Revision>,
    /// Distinct revision authors
    pub contributors: Option<u64>,
}

/// One entry of a document's change history
///
/// Stored as a `[revision, timestamp, author]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct Revision {
    /// Revision id (commit hash)
    pub revision: String,
    /// Timestamp as reported by the history source
    pub timestamp: String,
    /// Author name
    pub author: String,
}

impl Revision {
    /// Create revision entry
    #[must_use]
    pub fn new(
        revision: impl Into<String>,
        timestamp: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            revision: revision.into(),
            timestamp: timestamp.into(),
            author: author.into(),
        }
    }
}

impl From<(String, String, String)> for Revision {
    fn from((revision, timestamp, author): (String, String, String)) -> Self {
        Self {
            revision,
            timestamp,
            author,
        }
    }
}

impl From<Revision> for (String, String, String) {
    fn from(r: Revision) -> Self {
        (r.revision, r.timestamp, r.author)
    }
}

/// `insights` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    /// Word → count, most frequent first
    #[serde(default)]
    pub word_list: IndexMap<String, u64>,
    /// Sorted free-text mentions of other documents
    #[serde(default)]
    pub references: Vec<CanonicalRef>,
    /// Dependencies reported by the external classifier
    #[serde(default)]
    pub dependencies: Dependencies,
}

/// Classifier-supplied dependency list
///
/// `Unknown` means the classifier could not answer. It is kept distinct from
/// `Known(vec![])`, which means the classifier answered "none".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dependencies {
    /// Classifier answered with this list
    Known(Vec<CanonicalRef>),
    /// Classifier unavailable or its answer unusable
    #[default]
    Unknown,
}

impl Dependencies {
    /// Whether the dependency list is unknown
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Known dependencies, if any
    #[inline]
    #[must_use]
    pub fn known(&self) -> Option<&[CanonicalRef]> {
        match self {
            Self::Known(refs) => Some(refs),
            Self::Unknown => None,
        }
    }
}

impl Serialize for Dependencies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(refs) => refs.serialize(serializer),
            Self::Unknown => [DEPENDENCIES_UNKNOWN_SENTINEL].serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Dependencies {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        if raw.len() == 1 && raw[0] == DEPENDENCIES_UNKNOWN_SENTINEL {
            return Ok(Self::Unknown);
        }
        Ok(Self::Known(
            raw.iter().filter_map(|s| CanonicalRef::parse(s)).collect(),
        ))
    }
}
