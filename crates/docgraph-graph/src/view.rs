//! Serializable query surface
//!
//! ```json
//! {
//!   "nodes": [{ "id": "32", "title": "...", "status": "Final", "contributors": 4 }],
//!   "edges": [{ "source": "32", "target": "43", "relation": "requires" }]
//! }
//! ```

use crate::graph::RelationshipGraph;
use docgraph_record::CanonicalRef;
use docgraph_refs::RelationKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status reported for nodes that have none
pub const UNKNOWN_STATUS: &str = "Unknown";

/// One node of a [`GraphView`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    /// Canonical reference
    pub id: CanonicalRef,
    /// Title, if backed by a record
    pub title: Option<String>,
    /// Status, if backed by a record
    pub status: Option<String>,
    /// Contributor count, if known
    pub contributors: Option<u64>,
}

impl NodeView {
    /// Status used for filtering
    #[inline]
    #[must_use]
    pub fn effective_status(&self) -> &str {
        self.status.as_deref().unwrap_or(UNKNOWN_STATUS)
    }
}

/// One edge of a [`GraphView`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    /// Edge tail
    pub source: CanonicalRef,
    /// Edge head
    pub target: CanonicalRef,
    /// Relation kind
    pub relation: RelationKind,
}

/// Node and edge lists, in canonical order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    /// Nodes
    pub nodes: Vec<NodeView>,
    /// Edges
    pub edges: Vec<EdgeView>,
}

impl GraphView {
    /// Full view of a graph
    #[must_use]
    pub fn of(graph: &RelationshipGraph) -> Self {
        let nodes = graph
            .nodes()
            .into_iter()
            .map(|(id, attributes)| NodeView {
                id: id.clone(),
                title: attributes.and_then(|a| a.title.clone()),
                status: attributes.and_then(|a| a.status.clone()),
                contributors: attributes.and_then(|a| a.contributors),
            })
            .collect();
        let edges = graph
            .edges()
            .into_iter()
            .map(|e| EdgeView {
                source: e.source,
                target: e.target,
                relation: e.kind,
            })
            .collect();
        Self { nodes, edges }
    }

    /// Distinct statuses, with [`UNKNOWN_STATUS`] for nodes without one
    #[must_use]
    pub fn statuses(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(NodeView::effective_status).collect()
    }

    /// Restrict to nodes with `status`
    ///
    /// Edges with at least one visible endpoint stay visible, and both of
    /// their endpoints are kept in the node list.
    #[must_use]
    pub fn filter_status(&self, status: &str) -> Self {
        let visible: BTreeSet<&CanonicalRef> = self
            .nodes
            .iter()
            .filter(|n| n.effective_status() == status)
            .map(|n| &n.id)
            .collect();
        let edges: Vec<EdgeView> = self
            .edges
            .iter()
            .filter(|e| visible.contains(&e.source) || visible.contains(&e.target))
            .cloned()
            .collect();
        let keep: BTreeSet<&CanonicalRef> = edges
            .iter()
            .flat_map(|e| [&e.source, &e.target])
            .chain(visible.iter().copied())
            .collect();
        let nodes = self
            .nodes
            .iter()
            .filter(|n| keep.contains(&n.id))
            .cloned()
            .collect();
        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeAttributes, ReferenceEdge};
    use pretty_assertions::assert_eq;

    fn n(id: u32) -> CanonicalRef {
        CanonicalRef::Numbered(id)
    }

    fn status(s: &str) -> NodeAttributes {
        NodeAttributes {
            status: Some(s.to_string()),
            ..NodeAttributes::default()
        }
    }

    fn sample() -> GraphView {
        let mut graph = RelationshipGraph::new();
        graph.upsert_node(&n(1), status("Final"));
        graph.upsert_node(&n(2), status("Draft"));
        graph.upsert_node(&n(3), status("Draft"));
        graph.add_edge(&ReferenceEdge::new(n(1), n(2), RelationKind::Requires));
        graph.add_edge(&ReferenceEdge::new(n(2), n(3), RelationKind::Requires));
        graph.add_edge(&ReferenceEdge::new(n(3), n(9), RelationKind::SupersededBy));
        GraphView::of(&graph)
    }

    #[test]
    fn view_lists_everything() {
        let view = sample();
        assert_eq!(view.nodes.len(), 4);
        assert_eq!(view.edges.len(), 3);
        assert_eq!(
            view.statuses().into_iter().collect::<Vec<_>>(),
            vec!["Draft", "Final", "Unknown"]
        );
    }

    #[test]
    fn filter_keeps_edges_touching_visible_nodes() {
        let view = sample().filter_status("Final");
        let ids: Vec<_> = view.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![n(1), n(2)]);
        assert_eq!(view.edges.len(), 1);
    }

    #[test]
    fn unknown_status_matches_dangling_nodes() {
        let view = sample().filter_status(UNKNOWN_STATUS);
        let ids: Vec<_> = view.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![n(3), n(9)]);
        assert_eq!(view.edges[0].relation, RelationKind::SupersededBy);
    }

    #[test]
    fn serializes_with_relation_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["edges"][0]["relation"], "requires");
        assert_eq!(json["nodes"][3]["id"], "9");
        assert!(json["nodes"][3]["title"].is_null());
    }
}
