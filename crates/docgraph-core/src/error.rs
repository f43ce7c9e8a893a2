//! Error types for docgraph core
//!
//! Provides error handling for:
//! - Configuration loading
//! - Record store I/O and decoding
//! - Systemic pipeline failures (the run cannot proceed)
//! - Per-document failures (the document is skipped, the run continues)

use docgraph_preamble::{HeaderError, RecordError};
use docgraph_refs::RefsError;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Record store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File system operation failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded
    #[error("cannot encode record {}: {source}", .path.display())]
    Encode {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Stored record is not a valid document object
    #[error("malformed record {}: {reason}", .path.display())]
    MalformedSourceRecord {
        /// Record path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop a whole run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input directory cannot be listed
    #[error("cannot read input directory {}: {source}", .path.display())]
    InputUnreadable {
        /// Directory path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Output directory cannot be created
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputUncreatable {
        /// Directory path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reference syntax is unusable
    #[error("reference syntax error: {0}")]
    Syntax(#[from] RefsError),
}

/// Why one document was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFailure {
    /// Source has no header block
    NoHeaderBlockFound,
    /// Identifier could not be resolved; the partial record went to the
    /// unresolved bucket
    UnresolvedIdentifier {
        /// Identifier text, if any
        raw: Option<String>,
    },
    /// Stored record is not a valid document object
    MalformedSourceRecord(String),
    /// No source file for a stored record
    SourceMissing,
    /// Another source claimed the same storage key first
    DuplicateIdentifier {
        /// Storage key both sources map to
        key: String,
        /// Source whose record was kept
        kept: PathBuf,
    },
    /// Read or write failed
    Io(String),
    /// Document task panicked or was cancelled
    Aborted(String),
}

impl Display for DocumentFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHeaderBlockFound => f.write_str("no header block found"),
            Self::UnresolvedIdentifier { raw: Some(raw) } => {
                write!(f, "unresolved identifier '{raw}'")
            }
            Self::UnresolvedIdentifier { raw: None } => f.write_str("missing identifier"),
            Self::MalformedSourceRecord(reason) => write!(f, "malformed record: {reason}"),
            Self::SourceMissing => f.write_str("source document not found"),
            Self::DuplicateIdentifier { key, kept } => {
                write!(f, "duplicate storage key '{key}' (kept {})", kept.display())
            }
            Self::Io(reason) => write!(f, "I/O error: {reason}"),
            Self::Aborted(reason) => write!(f, "task aborted: {reason}"),
        }
    }
}

impl From<HeaderError> for DocumentFailure {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::NoHeaderBlockFound => Self::NoHeaderBlockFound,
        }
    }
}

impl From<&RecordError> for DocumentFailure {
    fn from(err: &RecordError) -> Self {
        match err {
            RecordError::UnresolvedIdentifier { raw, .. } => {
                Self::UnresolvedIdentifier { raw: raw.clone() }
            }
        }
    }
}

impl From<StoreError> for DocumentFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedSourceRecord { reason, .. } => Self::MalformedSourceRecord(reason),
            other => Self::Io(other.to_string()),
        }
    }
}
