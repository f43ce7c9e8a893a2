//! docgraph Preamble Extraction
//!
//! The boundary between raw document text and normalized records.
//!
//! # Core Operations
//!
//! - **Parse**: locate the `<pre>` header block and extract its fields
//! - **Check**: score required fields and section headings
//! - **Build**: emit the schema-ordered preamble and resolve the identifier
//!
//! # Architecture
//!
//! ```text
//! text → HeaderParser → ParsedHeader ─┬→ ComplianceChecker → ComplianceReport
//!                                     └──────────────┬───────────┘
//!                                             RecordBuilder → Preamble → DocumentRecord
//! ```
//!
//! # Example
//!
//! ```rust
//! use docgraph_preamble::PreambleExtractor;
//!
//! let text = "<pre>\n  BIP: 32\n  Title: HD Wallets\n</pre>\n==Abstract==\n";
//! let extraction = PreambleExtractor::new().extract(text).unwrap();
//! let record = extraction.into_record().unwrap();
//! assert_eq!(record.id.get(), 32);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod compliance;
pub mod error;
pub mod header;

pub use builder::RecordBuilder;
pub use compliance::{
    scan_headings, score_for, ComplianceChecker, ComplianceReport, HeadingCheck, HeadingReport,
    HeadingStatus, EXPECTED_HEADINGS,
};
pub use error::{HeaderError, RecordError};
pub use header::{canonical_key, HeaderParser, ParsedHeader};

use docgraph_record::{DocumentRecord, Preamble};

/// Everything extracted from one document
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Schema-ordered preamble with score
    pub preamble: Preamble,
    /// Compliance details behind the score
    pub report: ComplianceReport,
    /// Document text without the header block
    pub body: String,
}

impl Extraction {
    /// Resolve into a record
    ///
    /// # Errors
    /// [`RecordError::UnresolvedIdentifier`] carrying the partial preamble
    pub fn into_record(self) -> Result<DocumentRecord, RecordError> {
        RecordBuilder::new().resolve(self.preamble)
    }
}

/// Parse, check and build in one step
#[derive(Debug, Clone, Copy, Default)]
pub struct PreambleExtractor {
    parser: HeaderParser,
    checker: ComplianceChecker,
    builder: RecordBuilder,
}

impl PreambleExtractor {
    /// Create new extractor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the preamble of one document
    ///
    /// # Errors
    /// [`HeaderError::NoHeaderBlockFound`] if the document has no header block
    pub fn extract(&self, text: &str) -> Result<Extraction, HeaderError> {
        let header = self.parser.parse(text)?;
        let report = self.checker.check(&header, text);
        let preamble = self.builder.build(&header, &report);
        tracing::debug!(
            id = preamble.raw_identifier().unwrap_or("?"),
            score = report.score(),
            "extracted preamble"
        );
        Ok(Extraction {
            preamble,
            report,
            body: header.body,
        })
    }
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for preamble extraction
    pub use crate::{
        ComplianceChecker, ComplianceReport, Extraction, HeaderError, HeaderParser,
        PreambleExtractor, RecordBuilder, RecordError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn extractor_end_to_end() {
        let text = "intro\n<pre>\n  BIP: 0042\n  Title: Finite supply\n</pre>\n==Abstract==\nbody words\n";
        let extraction = PreambleExtractor::new().extract(text).unwrap();
        assert_eq!(extraction.report.passed(), 3);
        assert!(extraction.body.contains("body words"));
        let record = extraction.into_record().unwrap();
        assert_eq!(record.id.get(), 42);
        assert_eq!(record.preamble.text("title"), Some("Finite supply"));
    }

    #[test]
    fn extractor_propagates_missing_block() {
        let err = PreambleExtractor::new().extract("plain text").unwrap_err();
        assert_eq!(err, HeaderError::NoHeaderBlockFound);
    }
}
