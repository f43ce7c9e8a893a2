//! docgraph Enrichment
//!
//! External collaborators and the merge that folds their output into stored
//! records.
//!
//! # Core Concepts
//!
//! - [`DependencyClassifier`]: names the documents a text depends on
//! - [`HistorySource`]: change history of a source file
//! - [`EnrichmentMerger`]: overwrite-merge into `metadata` / `insights`
//!
//! Failures never abort a batch. A classifier that errors or times out
//! yields `Dependencies::Unknown`; a history source that errors yields an
//! empty history.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod classifier;
pub mod error;
pub mod history;
pub mod merger;

pub use classifier::{
    classify_bounded, dependency_prompt, parse_dependencies, ChatCompletionClassifier,
    DependencyClassifier, DisabledClassifier, DEFAULT_TEMPERATURE,
};
pub use error::{ClassifierError, HistoryError};
pub use history::{history_or_empty, parse_log, GitLogHistory, HistorySource, NoHistory};
pub use merger::{metadata_from_history, EnrichmentMerger, UPDATE_STAMP_FORMAT};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for enrichment
    pub use crate::{
        classify_bounded, DependencyClassifier, EnrichmentMerger, HistorySource,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
