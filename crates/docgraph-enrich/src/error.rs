//! Error types for enrichment
//!
//! None of these abort a batch: classifier errors degrade to
//! `Dependencies::Unknown`, history errors to an empty history.

/// Errors from a dependency classifier
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Classifier is switched off or has no credentials
    #[error("classifier disabled")]
    Disabled,

    /// Request could not be sent or returned an error status
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response lacks the expected message content
    #[error("response has no message content")]
    MissingContent,

    /// Message content is not a JSON array of references
    #[error("malformed dependency list: {0}")]
    MalformedResponse(String),

    /// Classification exceeded its time bound
    #[error("classification timed out after {duration_secs}s")]
    Timeout {
        /// Bound that elapsed
        duration_secs: u64,
    },
}

/// Errors from a version-history source
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// History command could not be started
    #[error("failed to run history command: {0}")]
    Spawn(#[from] std::io::Error),

    /// History command exited unsuccessfully
    #[error("history command failed ({status}): {stderr}")]
    CommandFailed {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },
}
