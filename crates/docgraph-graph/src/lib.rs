//! docgraph Relationship Graph
//!
//! Directed graph of `requires`, `replaces`, `superseded_by` and (optionally)
//! `mentions` relations between documents, rebuilt from stored records on
//! every query pass.
//!
//! # Core Concepts
//!
//! - [`RelationshipGraphBuilder`]: single-threaded reduction over records
//! - [`RelationshipGraph`]: petgraph-backed graph with dedup and queries
//! - [`GraphView`]: JSON query surface with status filtering
//!
//! # Example
//!
//! ```rust
//! use docgraph_graph::{GraphView, RelationshipGraphBuilder};
//! use docgraph_record::{DocumentId, DocumentRecord, Preamble};
//! use docgraph_refs::{ReferenceNormalizer, ReferenceSyntax};
//!
//! let normalizer = ReferenceNormalizer::new(ReferenceSyntax::default()).unwrap();
//! let mut preamble = Preamble::new();
//! preamble.set("requires", "bip-0007".into());
//!
//! let mut builder = RelationshipGraphBuilder::new(&normalizer);
//! builder.add_record(&DocumentRecord::new(DocumentId::new(5), preamble));
//! let view = GraphView::of(&builder.build());
//! assert_eq!(view.nodes.len(), 2);
//! assert_eq!(view.edges.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod graph;
pub mod view;

pub use builder::RelationshipGraphBuilder;
pub use docgraph_refs::RelationKind;
pub use graph::{NodeAttributes, ReferenceEdge, RelationshipGraph};
pub use view::{EdgeView, GraphView, NodeView, UNKNOWN_STATUS};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for graph construction
    pub use crate::{GraphView, RelationKind, RelationshipGraph, RelationshipGraphBuilder};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
