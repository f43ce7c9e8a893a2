//! Relationship graph
//!
//! Nodes are canonical references. A node backed by a record carries its
//! attributes; a node that is only ever referenced carries none.

use docgraph_record::CanonicalRef;
use docgraph_refs::RelationKind;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Attributes of a node backed by a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Document title
    pub title: Option<String>,
    /// Lifecycle status
    pub status: Option<String>,
    /// Layer
    pub layer: Option<String>,
    /// Distinct contributors, when metadata is available
    pub contributors: Option<u64>,
}

/// Directed edge between two canonical references
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceEdge {
    /// Edge tail
    pub source: CanonicalRef,
    /// Edge head
    pub target: CanonicalRef,
    /// Relation kind
    pub kind: RelationKind,
}

impl ReferenceEdge {
    /// Create edge
    #[inline]
    #[must_use]
    pub fn new(source: CanonicalRef, target: CanonicalRef, kind: RelationKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphNode {
    reference: CanonicalRef,
    attributes: Option<NodeAttributes>,
}

/// Directed, multi-relation graph over canonical references
///
/// Edges are unique per `(source, target, kind)`; distinct kinds between the
/// same pair coexist. Cycles are allowed.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    inner: DiGraph<GraphNode, RelationKind>,
    index: HashMap<CanonicalRef, NodeIndex>,
    seen: HashSet<(NodeIndex, NodeIndex, RelationKind)>,
}

impl RelationshipGraph {
    /// Create empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, reference: &CanonicalRef) -> NodeIndex {
        if let Some(&idx) = self.index.get(reference) {
            return idx;
        }
        let idx = self.inner.add_node(GraphNode {
            reference: reference.clone(),
            attributes: None,
        });
        self.index.insert(reference.clone(), idx);
        idx
    }

    /// Add or replace the attributes of a node
    pub fn upsert_node(&mut self, reference: &CanonicalRef, attributes: NodeAttributes) {
        let idx = self.ensure_node(reference);
        if let Some(previous) = self.inner[idx].attributes.replace(attributes) {
            tracing::warn!(node = %reference, title = ?previous.title, "node attributes replaced");
        }
    }

    /// Add an edge; returns `false` for self-edges and duplicates
    pub fn add_edge(&mut self, edge: &ReferenceEdge) -> bool {
        if edge.source == edge.target {
            return false;
        }
        let source = self.ensure_node(&edge.source);
        let target = self.ensure_node(&edge.target);
        if !self.seen.insert((source, target, edge.kind)) {
            return false;
        }
        self.inner.add_edge(source, target, edge.kind);
        true
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether `reference` is a node
    #[inline]
    #[must_use]
    pub fn contains(&self, reference: &CanonicalRef) -> bool {
        self.index.contains_key(reference)
    }

    /// Attributes of a node; `None` for unknown or referenced-only nodes
    #[must_use]
    pub fn attributes(&self, reference: &CanonicalRef) -> Option<&NodeAttributes> {
        let idx = *self.index.get(reference)?;
        self.inner[idx].attributes.as_ref()
    }

    /// All nodes with their attributes, in canonical order
    #[must_use]
    pub fn nodes(&self) -> Vec<(&CanonicalRef, Option<&NodeAttributes>)> {
        let mut nodes: Vec<_> = self
            .inner
            .node_weights()
            .map(|n| (&n.reference, n.attributes.as_ref()))
            .collect();
        nodes.sort_by(|a, b| a.0.cmp(b.0));
        nodes
    }

    /// All edges, sorted
    #[must_use]
    pub fn edges(&self) -> Vec<ReferenceEdge> {
        let mut edges: Vec<_> = self
            .inner
            .edge_references()
            .map(|e| {
                ReferenceEdge::new(
                    self.inner[e.source()].reference.clone(),
                    self.inner[e.target()].reference.clone(),
                    *e.weight(),
                )
            })
            .collect();
        edges.sort();
        edges
    }

    fn neighbors(&self, reference: &CanonicalRef, direction: Direction) -> Vec<CanonicalRef> {
        let Some(&idx) = self.index.get(reference) else {
            return Vec::new();
        };
        self.inner
            .neighbors_directed(idx, direction)
            .map(|n| self.inner[n].reference.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Nodes with an edge into `reference`
    #[must_use]
    pub fn predecessors(&self, reference: &CanonicalRef) -> Vec<CanonicalRef> {
        self.neighbors(reference, Direction::Incoming)
    }

    /// Nodes `reference` has an edge into
    #[must_use]
    pub fn successors(&self, reference: &CanonicalRef) -> Vec<CanonicalRef> {
        self.neighbors(reference, Direction::Outgoing)
    }

    /// Whether the graph contains a directed cycle
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.inner)
    }
}
