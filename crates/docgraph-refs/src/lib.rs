//! docgraph Cross-Reference Normalization
//!
//! Turns the many ways a document can point at another one into a single
//! canonical form, so graph endpoints compare equal regardless of prefix,
//! case or zero padding.
//!
//! # Core Concepts
//!
//! - [`ReferenceSyntax`]: configurable id prefix and mention keyword
//! - [`ReferenceNormalizer`]: structured fields, free-text mentions, loose tokens
//! - [`RelationKind`]: requires / replaces / superseded-by / mentions
//!
//! # Example
//!
//! ```rust
//! use docgraph_record::CanonicalRef;
//! use docgraph_refs::{ReferenceNormalizer, ReferenceSyntax};
//!
//! let normalizer = ReferenceNormalizer::new(ReferenceSyntax::default()).unwrap();
//! let refs = normalizer.field_refs("bip-0032, BIP-39");
//! assert!(refs.contains(&CanonicalRef::Numbered(32)));
//! assert_eq!(normalizer.mentions("see BIP 9", None), vec![CanonicalRef::Numbered(9)]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod kind;
pub mod normalizer;
pub mod syntax;

pub use error::RefsError;
pub use kind::RelationKind;
pub use normalizer::ReferenceNormalizer;
pub use syntax::ReferenceSyntax;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for reference normalization
    pub use crate::{ReferenceNormalizer, ReferenceSyntax, RefsError, RelationKind};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
