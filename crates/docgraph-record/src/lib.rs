//! docgraph Record Model
//!
//! Normalized per-document records shared by every stage of the pipeline.
//!
//! # Core Concepts
//!
//! - [`DocumentId`]: canonical numeric identifier (no leading zeros)
//! - [`CanonicalRef`]: normalized reference target, possibly dangling
//! - [`Preamble`]: schema-ordered header fields plus compliance score
//! - [`DocumentFile`]: stored `raw` / `metadata` / `insights` object
//! - [`Dependencies`]: classifier output, with `Unknown` kept distinct from empty
//!
//! # Example
//!
//! ```rust
//! use docgraph_record::{DocumentId, Preamble};
//!
//! let mut preamble = Preamble::new();
//! preamble.set("bip", "0032".into());
//!
//! let id = preamble.identifier().unwrap();
//! assert_eq!(id, DocumentId::new(32));
//! assert_eq!(id.storage_key("bip-"), "bip-0032");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod field;
pub mod id;
pub mod preamble;

// Re-exports
pub use document::{
    Dependencies, DocumentFile, DocumentRecord, Insights, Metadata, RawSection, Revision,
    DEPENDENCIES_UNKNOWN_SENTINEL,
};
pub use field::{
    is_list_field, is_schema_field, schema_fields, FieldValue, ID_FIELD, LIST_FIELDS,
    OPTIONAL_FIELDS, REFERENCE_FIELDS, REQUIRED_FIELDS, SCORE_KEY,
};
pub use id::{CanonicalRef, DocumentId, IdError};
pub use preamble::Preamble;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with records
    pub use crate::{
        CanonicalRef, Dependencies, DocumentFile, DocumentId, DocumentRecord, FieldValue, Insights, Metadata,
        Preamble, Revision,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
