//! Error types for header extraction
//!
//! Provides error handling for:
//! - Locating the header block (parse)
//! - Resolving the canonical identifier (record building)

use docgraph_record::{IdError, Preamble};

/// Errors while parsing a document header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// Document contains no `<pre>` header block
    #[error("no header block found")]
    NoHeaderBlockFound,
}

/// Errors while turning a preamble into a resolved record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// Identifier field absent or not numeric; the partial preamble is kept
    #[error("unresolved identifier {raw:?}: {source}")]
    UnresolvedIdentifier {
        /// Identifier text as found in the header, if any
        raw: Option<String>,
        /// Why resolution failed
        #[source]
        source: IdError,
        /// Everything that was extracted, including the score
        preamble: Box<Preamble>,
    },
}

impl RecordError {
    /// Partial preamble carried by the error
    #[inline]
    #[must_use]
    pub fn preamble(&self) -> &Preamble {
        match self {
            Self::UnresolvedIdentifier { preamble, .. } => preamble,
        }
    }

    /// Take the partial preamble out of the error
    #[inline]
    #[must_use]
    pub fn into_preamble(self) -> Preamble {
        match self {
            Self::UnresolvedIdentifier { preamble, .. } => *preamble,
        }
    }
}
