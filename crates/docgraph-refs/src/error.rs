//! Error types for reference normalization

/// Errors building a normalizer from a reference syntax
#[derive(Debug, thiserror::Error)]
pub enum RefsError {
    /// Mention keyword is empty and would match every number
    #[error("mention keyword must not be empty")]
    EmptyKeyword,

    /// Mention pattern could not be compiled
    #[error("invalid mention pattern: {0}")]
    Pattern(#[from] regex::Error),
}
