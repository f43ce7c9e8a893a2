//! docgraph Core
//!
//! Configuration, storage and batch orchestration for a document corpus.
//!
//! # Core Concepts
//!
//! - [`PipelineConfig`]: TOML-backed settings with builder methods
//! - [`RecordStore`]: one JSON file per document, keyed by storage key
//! - [`Pipeline`]: extract, enrich, graph and summary passes
//! - [`CorpusSummary`]: fold over stored documents
//!
//! # Architecture
//!
//! ```text
//! sources/*.mediawiki ──extract──▶ records/bip-NNNN.json ──enrich──▶ records/bip-NNNN.json
//!                          │                                              │
//!                          └──▶ records/unresolved/<stem>.json            ├──graph──▶ GraphView
//!                                                                         └──summary──▶ CorpusSummary
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use docgraph_core::{Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), docgraph_core::PipelineError> {
//! let pipeline = Pipeline::new(PipelineConfig::new().with_max_concurrency(4))?;
//! let report = pipeline.extract(Path::new("bips"), Path::new("out")).await?;
//! println!("{} records written", report.written.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod insights;
pub mod pipeline;
pub mod source;
pub mod store;

pub use config::{ClassifierConfig, PipelineConfig};
pub use corpus::{author_name, CorpusSummary};
pub use error::{ConfigError, DocumentFailure, PipelineError, StoreError};
pub use insights::{derive_insights, word_list, STOP_WORDS};
pub use pipeline::{BatchReport, Pipeline};
pub use source::{discover, find_source};
pub use store::{LoadedRecords, RecordStore, UNRESOLVED_DIR};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the pipeline
    pub use crate::{
        BatchReport, CorpusSummary, DocumentFailure, Pipeline, PipelineConfig, PipelineError,
        RecordStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
